//! Launch configuration: team shape and tier thresholds for one pass.

use serde::{Deserialize, Serialize};

use crate::error::{FrontierError, Result};

/// Shape of the lane grid and the degree thresholds that pick a tier.
///
/// A node with out-degree `d` is serviced by:
/// - the whole team if `d >= min_team_degree`,
/// - one sub-group if `min_subgroup_degree <= d < min_team_degree`,
/// - the fine-grained edge buffer if `0 < d < min_subgroup_degree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Number of teams (one out-frontier partition each).
    pub num_teams: usize,
    /// Lanes per team.
    pub team_size: usize,
    /// Lanes per sub-group; must divide `team_size`.
    pub subgroup_size: usize,
    /// Degree at or above which the whole team services a node.
    pub min_team_degree: usize,
    /// Degree at or above which one sub-group services a node.
    pub min_subgroup_degree: usize,
    /// Slots in the team-local fine-grained edge buffer.
    pub fine_grain_capacity: usize,
    /// Reruns in a row without prefix growth the level driver allows before giving up.
    pub max_retries: usize,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self::for_lanes(4, 32, 8)
    }
}

impl LaunchConfig {
    /// Builds a configuration for the given grid with thresholds derived from it.
    pub const fn for_lanes(num_teams: usize, team_size: usize, subgroup_size: usize) -> Self {
        Self {
            num_teams,
            team_size,
            subgroup_size,
            min_team_degree: team_size,
            min_subgroup_degree: subgroup_size,
            fine_grain_capacity: team_size,
            max_retries: 8,
        }
    }

    /// Sets both degree thresholds.
    #[must_use]
    pub const fn with_thresholds(mut self, min_subgroup_degree: usize, min_team_degree: usize) -> Self {
        self.min_subgroup_degree = min_subgroup_degree;
        self.min_team_degree = min_team_degree;
        self
    }

    /// Sets the fine-grained buffer capacity.
    #[must_use]
    pub const fn with_fine_grain_capacity(mut self, capacity: usize) -> Self {
        self.fine_grain_capacity = capacity;
        self
    }

    /// Sets the driver's retry budget.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Parses a configuration from JSON; missing fields take their defaults.
    ///
    /// # Errors
    /// Returns [`FrontierError::Config`] on malformed JSON and
    /// [`FrontierError::InvalidConfig`] if the result fails [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the grid and thresholds are consistent.
    ///
    /// # Errors
    /// Returns [`FrontierError::InvalidConfig`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(FrontierError::InvalidConfig(msg));
        if self.num_teams == 0 {
            return fail("num_teams must be > 0".into());
        }
        if self.team_size == 0 {
            return fail("team_size must be > 0".into());
        }
        if self.subgroup_size == 0 || self.team_size % self.subgroup_size != 0 {
            return fail(format!(
                "subgroup_size {} must be > 0 and divide team_size {}",
                self.subgroup_size, self.team_size
            ));
        }
        if self.min_subgroup_degree == 0 {
            return fail("min_subgroup_degree must be > 0".into());
        }
        if self.min_subgroup_degree > self.min_team_degree {
            return fail(format!(
                "min_subgroup_degree {} exceeds min_team_degree {}",
                self.min_subgroup_degree, self.min_team_degree
            ));
        }
        if self.fine_grain_capacity == 0 {
            return fail("fine_grain_capacity must be > 0".into());
        }
        Ok(())
    }

    /// Sub-groups per team.
    pub const fn subgroups_per_team(&self) -> usize {
        self.team_size / self.subgroup_size
    }

    /// Total lanes in the grid.
    pub const fn total_lanes(&self) -> usize {
        self.num_teams * self.team_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = LaunchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.subgroups_per_team(), 4);
        assert_eq!(config.total_lanes(), 128);
        assert_eq!(config.min_team_degree, config.team_size);
    }

    #[test]
    fn rejects_subgroup_not_dividing_team() {
        let config = LaunchConfig::for_lanes(2, 10, 4);
        assert!(matches!(config.validate(), Err(FrontierError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let config = LaunchConfig::for_lanes(2, 8, 4).with_thresholds(16, 8);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_sizes() {
        assert!(LaunchConfig::for_lanes(0, 8, 4).validate().is_err());
        assert!(LaunchConfig::for_lanes(2, 8, 4)
            .with_fine_grain_capacity(0)
            .validate()
            .is_err());
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = LaunchConfig::from_json(r#"{ "num_teams": 2, "max_retries": 3 }"#).unwrap();
        assert_eq!(config.num_teams, 2);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.team_size, LaunchConfig::default().team_size);
    }

    #[test]
    fn json_errors_are_reported() {
        assert!(matches!(
            LaunchConfig::from_json("{ not json"),
            Err(FrontierError::Config(_))
        ));
        assert!(matches!(
            LaunchConfig::from_json(r#"{ "subgroup_size": 5 }"#),
            Err(FrontierError::InvalidConfig(_))
        ));
    }
}
