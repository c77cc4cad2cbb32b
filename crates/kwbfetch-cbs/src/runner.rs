//! Pipeline orchestration: one fetch-and-write pass per requested year

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use indicatif::ProgressBar;
use kwbfetch_core::{SharedProgress, fmt_num};

use crate::catalog;
use crate::config::Config;
use crate::error::DownloadError;
use crate::page::Pager;
use crate::query;
use crate::sink::CsvSink;

/// Result of one year's download
#[derive(Debug)]
pub enum Outcome {
    /// Data fetched and written
    Written {
        path: PathBuf,
        rows: usize,
        pages: usize,
    },
    /// Output file was already present; nothing fetched
    AlreadyExists(PathBuf),
    /// Every page was empty; no file created
    NoRows { pages: usize },
}

/// Download one year's observations to `{output_dir}/kwb-{year}{suffix}.csv`.
///
/// The output file is created lazily on the first non-empty page, so a
/// run that yields no rows leaves no file. Any mid-fetch error deletes
/// the partial file before returning; an already existing file
/// short-circuits without issuing a single request.
pub fn download_year(
    config: &Config,
    year: u16,
    pb: &ProgressBar,
) -> Result<Outcome, DownloadError> {
    let dataset_id = catalog::dataset_for(year).ok_or(DownloadError::UnknownYear(year))?;

    fs::create_dir_all(&config.output_dir)?;
    let path = config.output_path(year);

    if path.exists() {
        log::info!("{year}: already exists: {}", path.display());
        return Ok(Outcome::AlreadyExists(path));
    }

    let url = query::observations_url(&config.base_url, dataset_id, &config.measures);
    log::info!("Fetching {year} from {url} ...");

    let mut sink: Option<CsvSink> = None;
    let mut rows = 0usize;
    let mut pages = 0usize;

    let mut fetch = || -> Result<(), DownloadError> {
        for page in Pager::new(url.as_str()) {
            let page = page?;
            pages += 1;

            if !page.value.is_empty() {
                if sink.is_none() {
                    sink = Some(CsvSink::create(&path)?);
                }
                if let Some(s) = sink.as_mut() {
                    rows += s.write_page(&page.value)?;
                }
            }

            pb.set_message(format!("page {pages}: {} rows", fmt_num(rows)));
            if page.next_link.is_some() {
                log::debug!("{year}: page {pages}: {rows} rows so far...");
            }
        }
        if let Some(s) = sink.as_mut() {
            s.finish()?;
        }
        Ok(())
    };

    match fetch() {
        Ok(()) => {
            if sink.is_some() {
                log::info!("{year}: saved {rows} rows to {}", path.display());
                Ok(Outcome::Written { path, rows, pages })
            } else {
                log::warn!("{year}: no rows returned, nothing written");
                Ok(Outcome::NoRows { pages })
            }
        }
        Err(e) => {
            // Never leave a truncated file behind
            if sink.take().is_some() {
                if let Err(rm) = fs::remove_file(&path) {
                    log::warn!("{year}: could not remove partial file: {rm}");
                }
            }
            Err(e)
        }
    }
}

/// Result of one year within a run
#[derive(Debug)]
pub struct YearResult {
    pub year: u16,
    pub result: Result<Outcome, DownloadError>,
}

/// Summary of a multi-year run
#[derive(Debug)]
pub struct RunSummary {
    pub results: Vec<YearResult>,
    pub written: usize,
    pub skipped: usize,
    pub empty: usize,
    pub failed: usize,
    pub total_rows: usize,
    pub elapsed: std::time::Duration,
}

impl RunSummary {
    pub fn log(&self) {
        log::info!("=== Run Summary ===");
        log::info!(
            "Years: {} written, {} skipped, {} empty, {} failed (of {})",
            self.written,
            self.skipped,
            self.empty,
            self.failed,
            self.results.len()
        );
        log::info!("Rows: {}", fmt_num(self.total_rows));
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
    }
}

/// Run the pipeline for each requested year, strictly in input order.
///
/// A failure for one year is logged and recorded; the remaining years
/// are still attempted.
pub fn run(config: &Config, years: &[u16], progress: SharedProgress) -> RunSummary {
    let start = Instant::now();
    let mut results = Vec::with_capacity(years.len());

    for &year in years {
        let pb = progress.stage_line(&year.to_string());
        let result = download_year(config, year, &pb);
        pb.finish_and_clear();

        if let Err(e) = &result {
            log::error!("Error fetching {year}: {e}");
        }
        results.push(YearResult { year, result });
    }

    let mut summary = RunSummary {
        results,
        written: 0,
        skipped: 0,
        empty: 0,
        failed: 0,
        total_rows: 0,
        elapsed: start.elapsed(),
    };
    for r in &summary.results {
        match &r.result {
            Ok(Outcome::Written { rows, .. }) => {
                summary.written += 1;
                summary.total_rows += rows;
            }
            Ok(Outcome::AlreadyExists(_)) => summary.skipped += 1,
            Ok(Outcome::NoRows { .. }) => summary.empty += 1,
            Err(_) => summary.failed += 1,
        }
    }

    summary.log();
    summary
}
