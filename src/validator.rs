//! Pile tolerance validation.
//!
//! Each parsed pile is matched against the building's reference table. Piles
//! without a reference record are reported as missing and take no further
//! part; matched piles get a measured toe level and are classified against
//! the tolerance window below the cutoff level.

use crate::constants::DEFAULT_LOWER_MARGIN;
use crate::models::{
    PileRecord, PileStatus, ReferenceRecord, ValidatedPile, ValidationOutcome, ValidationReport,
    hundredths, round2,
};
use crate::reference::{MatchOutcome, ReferenceTable};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Tolerance window for the measured toe level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceConfig {
    /// How far below the cutoff level the toe may sit (inclusive)
    pub lower_margin: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            lower_margin: DEFAULT_LOWER_MARGIN,
        }
    }
}

impl ToleranceConfig {
    /// Classify a measured toe level against a cutoff level
    ///
    /// OK when `cutoff - lower_margin <= toe <= cutoff`. Both sides are
    /// compared in whole hundredths so the bounds themselves are OK.
    pub fn classify(&self, measured_toe_level: f64, cutoff_level: f64) -> PileStatus {
        let level = hundredths(measured_toe_level);
        let upper = hundredths(cutoff_level);
        let lower = upper - hundredths(self.lower_margin);

        if (lower..=upper).contains(&level) {
            PileStatus::Ok
        } else {
            PileStatus::Faulty
        }
    }
}

/// Toe level reached by a pile: design level minus the measured length
pub fn measured_toe_level(reference: &ReferenceRecord, measured_length: f64) -> f64 {
    round2(round2(reference.toe_design_level) - round2(measured_length))
}

/// Validate every pile of a report against the reference table
pub fn validate_piles(
    piles: &[PileRecord],
    table: &ReferenceTable,
    tolerance: &ToleranceConfig,
) -> ValidationReport {
    let mut report = ValidationReport {
        piles: Vec::with_capacity(piles.len()),
        outcome: ValidationOutcome {
            pile_count: piles.len(),
            ..ValidationOutcome::default()
        },
    };

    for pile in piles {
        let reference = match table.match_pile(pile) {
            MatchOutcome::Found(reference) => reference,
            MatchOutcome::NotFound => {
                debug!("Pile {} has no reference record", pile.pile_label);
                report.outcome.missing.push(pile.pile_label.clone());
                continue;
            }
        };

        let validated = validate_pile(pile, reference, tolerance, &mut report.outcome);
        report.piles.push(validated);
    }

    info!(
        "Validated {} piles for {}: {} matched, {} faulty, {} missing",
        report.outcome.pile_count,
        table.building(),
        report.outcome.matched_count,
        report.outcome.faulty.len(),
        report.outcome.missing.len()
    );

    report
}

fn validate_pile(
    pile: &PileRecord,
    reference: &ReferenceRecord,
    tolerance: &ToleranceConfig,
    outcome: &mut ValidationOutcome,
) -> ValidatedPile {
    let length = round2(pile.measured_length);
    let toe_level = measured_toe_level(reference, length);
    let status = tolerance.classify(toe_level, round2(reference.cutoff_level));

    if status == PileStatus::Faulty {
        debug!(
            "Pile {} faulty: toe level {:.2} outside [{:.2}, {:.2}]",
            pile.pile_label,
            toe_level,
            reference.cutoff_level - tolerance.lower_margin,
            reference.cutoff_level
        );
        outcome.faulty.push(pile.pile_label.clone());
    }

    let min_length = outcome.min_length.map_or(length, |min| min.min(length));
    let max_length = outcome.max_length.map_or(length, |max| max.max(length));
    outcome.min_length = Some(min_length);
    outcome.max_length = Some(max_length);
    outcome.matched_count += 1;
    outcome.pile_types.insert(reference.pile_type.clone());
    outcome.pile_diameters.insert(reference.pile_diameter.clone());

    ValidatedPile {
        record: pile.clone(),
        reference: reference.clone(),
        measured_toe_level: toe_level,
        status,
        min_length,
        max_length,
    }
}
