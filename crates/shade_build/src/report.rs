//! Per-unit and whole-build results.

use crate::error::UnitError;

/// How a unit that succeeded was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    /// A valid cache entry existed; nothing was compiled.
    CacheHit,
    /// Both stages were compiled and the cache was updated.
    Compiled {
        /// `true` if the artifacts are source copies from the fallback.
        passthrough: bool,
    },
}

/// The result of attempting one unit.
pub type UnitResult = Result<UnitOutcome, UnitError>;

/// Results of a bulk build, in the order units were attempted.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// One entry per attempted unit.
    pub results: Vec<(String, UnitResult)>,
}

impl BuildReport {
    /// Returns `true` iff every attempted unit succeeded.
    pub fn success(&self) -> bool {
        self.results.iter().all(|(_, r)| r.is_ok())
    }

    /// Iterates over the failures.
    pub fn failures(&self) -> impl Iterator<Item = &UnitError> {
        self.results.iter().filter_map(|(_, r)| r.as_ref().err())
    }

    /// Number of units served from the cache.
    pub fn cached(&self) -> usize {
        self.count(|o| matches!(o, UnitOutcome::CacheHit))
    }

    /// Number of units compiled in this run.
    pub fn compiled(&self) -> usize {
        self.count(|o| matches!(o, UnitOutcome::Compiled { .. }))
    }

    /// Number of units that failed.
    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    fn count(&self, pred: impl Fn(&UnitOutcome) -> bool) -> usize {
        self.results
            .iter()
            .filter(|(_, r)| r.as_ref().is_ok_and(&pred))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnitErrorKind;
    use shade_common::Stage;
    use std::path::PathBuf;

    fn missing(unit: &str) -> UnitError {
        UnitError::new(
            unit,
            UnitErrorKind::SourceMissing {
                stage: Stage::Fragment,
                path: PathBuf::from(format!("{unit}.frag")),
            },
        )
    }

    #[test]
    fn empty_report_succeeds() {
        assert!(BuildReport::default().success());
    }

    #[test]
    fn any_failure_fails_the_build() {
        let report = BuildReport {
            results: vec![
                ("basic".to_string(), Ok(UnitOutcome::Compiled { passthrough: false })),
                ("broken".to_string(), Err(missing("broken"))),
                ("cached".to_string(), Ok(UnitOutcome::CacheHit)),
            ],
        };
        assert!(!report.success());
        assert_eq!(report.compiled(), 1);
        assert_eq!(report.cached(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures().next().unwrap().unit, "broken");
    }
}
