//! Tests for the batch processor
//!
//! Runs the pipeline over text reports and CSV reference exports written to
//! temporary directories.


use crate::config::Config;
use crate::pages::TextPageSource;
use crate::processor::BatchProcessor;
use crate::reference::CsvReferenceDirectory;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const REFERENCE_HEADER: &str =
    "Cölöp jele,Visszavésési szint,Cölöpcsúcs,Cölöp típus,Cölöp átmérő,Épület neve";

/// First page of a test report with one pile table
pub fn report_page(building: &str, date: &str, blows: u32, piles: &[(&str, &str)]) -> String {
    let labels: Vec<&str> = piles.iter().map(|p| p.0).collect();
    let lengths: Vec<&str> = piles.iter().map(|p| p.1).collect();
    let filler = |value: &str| vec![value; piles.len()].join("\n");
    format!(
        "HBM Pile Test - {building} - Debrecen\nProject\nOperator\nInstrument\n\
         Number of blows: {blows}\nMeasured Length [m]\n\n{}\n\n{}\n\n{}\n\n{}\n\n{}\n\n\
         notes\n\nremarks\n\n{date}-i mérés\nInspector\n1 of 1\nHBM\n",
        labels.join("\n"),
        filler("4,1"),
        filler("210"),
        filler("1,8"),
        lengths.join("\n"),
    )
}

/// Input, reference and output directories of one test run
pub struct Fixture {
    pub temp_dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let fixture = Self {
            temp_dir: TempDir::new().unwrap(),
        };
        fs::create_dir_all(fixture.input()).unwrap();
        fs::create_dir_all(fixture.reference()).unwrap();
        fixture
    }

    pub fn input(&self) -> PathBuf {
        self.temp_dir.path().join("input")
    }

    pub fn reference(&self) -> PathBuf {
        self.temp_dir.path().join("reference")
    }

    pub fn output(&self) -> PathBuf {
        self.temp_dir.path().join("output")
    }

    pub fn add_report(&self, name: &str, page: &str) -> PathBuf {
        let path = self.input().join(format!("text_{}.txt", name));
        fs::write(&path, page).unwrap();
        path
    }

    pub fn add_graphics(&self, name: &str, pages: usize) -> PathBuf {
        let path = self.input().join(format!("graphics_{}.txt", name));
        fs::write(&path, vec!["plot"; pages].join("\u{0c}")).unwrap();
        path
    }

    /// `rows` as "number,toe design level,cutoff level,type,diameter"
    pub fn add_reference(&self, building: &str, rows: &[&str]) {
        let mut contents = format!("Reference piles {}\n{}\n", building, REFERENCE_HEADER);
        for row in rows {
            contents.push_str(&format!("{},Hall {}\n", row, building));
        }
        fs::write(self.reference().join(format!("{}.csv", building)), contents).unwrap();
    }

    pub fn processor(&self, config: Config) -> BatchProcessor {
        BatchProcessor::new(
            config.clone(),
            Box::new(TextPageSource),
            Box::new(CsvReferenceDirectory::new(self.reference(), config.reference)),
            self.output(),
        )
        .with_progress(false)
    }

    pub fn report_dir(&self, building: &str, date: &str) -> PathBuf {
        self.output().join(building).join(format!("{}-i mérés", date))
    }
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}
