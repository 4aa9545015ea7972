//! Analysis statistics collection and reporting.
//!
//! This module summarizes an [`AnalysisReport`]. It provides:
//! 1. **Summary:** Intervals analyzed or failed, decisions made, and how many
//!    of them moved away from the equal split.
//! 2. **Threads:** Per preferred thread, the mean recommended way count and gain.
//! 3. **Exhaustive:** Catalogue misses against the equal split and how often
//!    the catalogue winner matches the marginal-gain recommendation.

use std::fmt::Write as _;

use crate::partition::AnalysisReport;

/// Aggregates for one preferred thread.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadStats {
    /// Decisions where this thread was preferred.
    pub decisions: u64,
    /// Decisions whose recommendation moved away from the equal split.
    pub improved: u64,
    /// Sum of recommended way counts.
    pub ways_sum: u64,
    /// Sum of recommendation gains over the equal split.
    pub gain_sum: f64,
}

impl ThreadStats {
    /// Mean recommended way count, 0 without decisions.
    pub const fn mean_ways(&self) -> f64 {
        if self.decisions == 0 {
            0.0
        } else {
            self.ways_sum as f64 / self.decisions as f64
        }
    }

    /// Mean recommended gain, 0 without decisions.
    pub const fn mean_gain(&self) -> f64 {
        if self.decisions == 0 {
            0.0
        } else {
            self.gain_sum / self.decisions as f64
        }
    }
}

/// Aggregate counters over one analysis run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisStats {
    /// Intervals present in the report.
    pub intervals: u64,
    /// Intervals skipped because of a data error.
    pub failed_intervals: u64,
    /// (interval, preferred thread) decisions.
    pub decisions: u64,
    /// Decisions with a marginal-gain recommendation.
    pub recommendations: u64,
    /// Recommendations that moved away from the equal split.
    pub improved: u64,
    /// Sum of recommendation gains over the equal split.
    pub total_gain: f64,
    /// Per preferred thread, indexed by thread id.
    pub threads: Vec<ThreadStats>,
    /// Decisions with a catalogue scan.
    pub exhaustive_runs: u64,
    /// Catalogue winners allocating exactly as the recommendation does.
    pub exhaustive_agreements: u64,
    /// Sum of catalogue winner misses.
    pub exhaustive_misses: u64,
    /// Sum of equal-split misses over the same decisions.
    pub equal_split_misses: u64,
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"threads"`, `"exhaustive"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "threads", "exhaustive"];

const RULE: &str = "==========================================================";
const SEPARATOR: &str = "----------------------------------------------------------";

impl AnalysisStats {
    /// Collects the counters of `report`.
    pub fn from_report(report: &AnalysisReport) -> Self {
        let mut stats = Self {
            intervals: report.intervals.len() as u64,
            failed_intervals: report.failed().count() as u64,
            threads: vec![ThreadStats::default(); report.config.num_threads],
            ..Self::default()
        };

        for (_, decision) in report.decisions() {
            stats.decisions += 1;
            let recommended = decision.recommended();

            if let Some(outcome) = recommended {
                let gain = decision.gain_over_equal_split();
                let moved = decision.moved_from_equal_split();
                stats.recommendations += 1;
                stats.total_gain += gain;
                if moved {
                    stats.improved += 1;
                }
                if let Some(thread) = stats.threads.get_mut(decision.preferred) {
                    thread.decisions += 1;
                    thread.ways_sum += outcome.best_ways as u64;
                    thread.gain_sum += gain;
                    if moved {
                        thread.improved += 1;
                    }
                }
            }

            if let Some(exhaustive) = &decision.exhaustive {
                stats.exhaustive_runs += 1;
                stats.exhaustive_misses += exhaustive.misses;
                stats.equal_split_misses += exhaustive.equal_split_misses;
                if recommended.is_some_and(|r| r.allocation == exhaustive.allocation) {
                    stats.exhaustive_agreements += 1;
                }
            }
        }
        stats
    }

    /// Mean recommended gain, 0 without recommendations.
    pub const fn mean_gain(&self) -> f64 {
        if self.recommendations == 0 {
            0.0
        } else {
            self.total_gain / self.recommendations as f64
        }
    }

    /// Renders the requested sections; an empty slice renders all of them.
    ///
    /// Unknown section names are ignored.
    pub fn render_sections(&self, sections: &[String]) -> String {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let mut out = String::new();

        let _ = writeln!(out, "\n{RULE}");
        let _ = writeln!(out, "CACHE PARTITION ANALYSIS STATISTICS");
        let _ = writeln!(out, "{RULE}");

        if want("summary") {
            let improved_pct = percent(self.improved, self.recommendations);
            let _ = writeln!(out, "intervals                {}", self.intervals);
            let _ = writeln!(out, "intervals_failed         {}", self.failed_intervals);
            let _ = writeln!(out, "decisions                {}", self.decisions);
            let _ = writeln!(out, "recommendations          {}", self.recommendations);
            let _ = writeln!(
                out,
                "improved                 {} ({improved_pct:.2}%)",
                self.improved
            );
            let _ = writeln!(out, "gain_total               {:.2}", self.total_gain);
            let _ = writeln!(out, "gain_mean                {:.2}", self.mean_gain());
            let _ = writeln!(out, "{SEPARATOR}");
        }

        if want("threads") {
            let _ = writeln!(out, "PREFERRED THREADS");
            for (thread, t) in self.threads.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "  thread{thread:<3} decisions {:>6}  improved {:>6}  \
                     ways {:>7.2}  gain {:>12.2}",
                    t.decisions,
                    t.improved,
                    t.mean_ways(),
                    t.mean_gain()
                );
            }
            let _ = writeln!(out, "{SEPARATOR}");
        }

        if want("exhaustive") {
            let saved = self.equal_split_misses.saturating_sub(self.exhaustive_misses);
            let _ = writeln!(out, "CATALOGUE SCAN");
            let _ = writeln!(out, "  scans                  {}", self.exhaustive_runs);
            let _ = writeln!(
                out,
                "  agreements             {} ({:.2}%)",
                self.exhaustive_agreements,
                percent(self.exhaustive_agreements, self.exhaustive_runs)
            );
            let _ = writeln!(out, "  misses                 {}", self.exhaustive_misses);
            let _ = writeln!(out, "  misses_equal_split     {}", self.equal_split_misses);
            let _ = writeln!(out, "  misses_saved           {saved}");
            let _ = writeln!(out, "{SEPARATOR}");
        }

        let _ = writeln!(out, "{RULE}");
        out
    }

    /// Prints only the requested statistics sections to stderr.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]. Pass
    /// an empty slice to print all sections (same as `print()`).
    pub fn print_sections(&self, sections: &[String]) {
        eprint!("{}", self.render_sections(sections));
    }

    /// Prints all statistics sections to stderr.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}

const fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
