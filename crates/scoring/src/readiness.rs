//! Readiness summary over repository signals.

use sitepulse_core::{ReadinessSummary, RepositorySignals, RiskLevel};

/// Signal weights. Docker and CI/CD dominate; orchestration manifests and
/// a start script fill the remainder.
const DOCKER_WEIGHT: u32 = 30;
const CICD_WEIGHT: u32 = 30;
const KUBERNETES_WEIGHT: u32 = 20;
const START_SCRIPT_WEIGHT: u32 = 20;

/// Derive the readiness summary block from detected repository signals.
///
/// `devops_score` is the weighted sum of the four signals;
/// `production_ready` requires start script, docker, and CI/CD together;
/// the risk tier is low at 70+, medium at 40+, high below that.
pub fn summarize(signals: &RepositorySignals) -> ReadinessSummary {
    let devops_score = u32::from(signals.docker) * DOCKER_WEIGHT
        + u32::from(signals.cicd) * CICD_WEIGHT
        + u32::from(signals.kubernetes) * KUBERNETES_WEIGHT
        + u32::from(signals.has_start_script) * START_SCRIPT_WEIGHT;

    let risk_level = if devops_score >= 70 {
        RiskLevel::Low
    } else if devops_score >= 40 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    };

    ReadinessSummary {
        devops_score,
        production_ready: signals.has_start_script && signals.docker && signals.cicd,
        risk_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_signals_present() {
        let summary = summarize(&RepositorySignals {
            docker: true,
            cicd: true,
            kubernetes: true,
            has_start_script: true,
        });
        assert_eq!(summary.devops_score, 100);
        assert!(summary.production_ready);
        assert_eq!(summary.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_no_signals_present() {
        let summary = summarize(&RepositorySignals::default());
        assert_eq!(summary.devops_score, 0);
        assert!(!summary.production_ready);
        assert_eq!(summary.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_missing_cicd_blocks_production_ready_at_low_risk() {
        // docker + kubernetes + start script = 70, right on the low-risk
        // boundary, but cicd absence still blocks production readiness.
        let summary = summarize(&RepositorySignals {
            docker: true,
            cicd: false,
            kubernetes: true,
            has_start_script: true,
        });
        assert_eq!(summary.devops_score, 70);
        assert!(!summary.production_ready);
        assert_eq!(summary.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_medium_tier() {
        let summary = summarize(&RepositorySignals {
            docker: true,
            cicd: false,
            kubernetes: false,
            has_start_script: true,
        });
        assert_eq!(summary.devops_score, 50);
        assert_eq!(summary.risk_level, RiskLevel::Medium);
    }
}
