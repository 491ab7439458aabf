//! Application constants for the pile checker
//!
//! Template defaults, reference database headers, tolerance values and the
//! output file names used throughout the pipeline.

// =============================================================================
// Report Template (layout v1)
// =============================================================================

/// Version tag of the built-in report layout
pub const LAYOUT_VERSION_V1: &str = "v1";

/// Column header text that precedes the pile table on every page
pub const MEASURED_LENGTH_MARKER: &str = "Measured Length [m]";

/// Footer and signature blocks at the end of every page
pub const TRAILING_BLOCKS: usize = 3;

/// Pile name, v peak, a peak, t50 and measured length
pub const PILE_TABLE_COLUMNS: usize = 5;

/// Header line positions on the first page
pub const TITLE_LINE: usize = 0;
pub const BLOW_COUNT_LINE: usize = 4;
pub const PAGE_COUNTER_LINE_FROM_END: usize = 3;
pub const DATE_LINE_FROM_END: usize = 5;

pub const PAGE_COUNTER_PREFIX: &str = "1 of ";
pub const DATE_SUFFIX: &str = "-i mérés";

// =============================================================================
// Reference Database
// =============================================================================

/// Rows above the header row in every reference sheet
pub const REFERENCE_HEADER_OFFSET: usize = 1;

pub mod reference_columns {
    pub const PILE_NUMBER: &str = "Cölöp jele";
    pub const TOE_DESIGN_LEVEL: &str = "Visszavésési szint";
    pub const CUTOFF_LEVEL: &str = "Cölöpcsúcs";
    pub const PILE_TYPE: &str = "Cölöp típus";
    pub const PILE_DIAMETER: &str = "Cölöp átmérő";
    pub const BUILDING_NAME: &str = "Épület neve";
}

// =============================================================================
// Validation
// =============================================================================

/// How far below the cutoff level a measured toe may sit
pub const DEFAULT_LOWER_MARGIN: f64 = 0.2;

/// Engineering values are stored and displayed with this many decimals
pub const DECIMALS: usize = 2;

// =============================================================================
// Advisory Section
// =============================================================================

pub const ADVISORY_BASE_PAGES: usize = 4;
pub const ADVISORY_BASE_PILES: usize = 25;
pub const ADVISORY_PILES_PER_PAGE: usize = 46;

// =============================================================================
// Inputs and Outputs
// =============================================================================

pub const TEXT_PREFIX: &str = "text";
pub const GRAPHICS_PREFIX: &str = "graphics";

/// Separator between pages in pre-decoded text reports
pub const PAGE_BREAK: char = '\u{0c}';

pub const DEFAULT_INPUT_DIR: &str = "input";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_PROJECT_PREFIX: &str = "FCH-20091_SIT_DEBRECEN_BMW";
pub const ARCHIVE_DIR_NAME: &str = "pdf";

pub const REPORT_OK_FILE: &str = "OK.txt";
pub const REPORT_ERROR_FILE: &str = "ERROR_FAULTY_OR_MISSING_PILES_FOUND.txt";
pub const SUMMARY_OK_FILE: &str = "MASTER_CHECK_OK.txt";
pub const SUMMARY_ERROR_FILE: &str = "MASTER_CHECK_ERROR_FAULTY_OR_MISSING_PILES_FOUND.txt";

/// Literal written in place of an empty faulty or missing list
pub const OK_MARKER: &str = "OK";

pub const CONFIG_DIR_NAME: &str = "pile_checker";
pub const CONFIG_FILE_NAME: &str = "config.json";
