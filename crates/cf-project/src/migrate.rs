//! Schema migration framework.

use crate::ProjectError;
use crate::schema::ScenarioDef;

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut scenario: ScenarioDef) -> Result<ScenarioDef, ProjectError> {
    while scenario.version < LATEST_VERSION {
        scenario = migrate_one_version(scenario)?;
    }
    Ok(scenario)
}

fn migrate_one_version(scenario: ScenarioDef) -> Result<ScenarioDef, ProjectError> {
    match scenario.version {
        0 => migrate_v0_to_v1(scenario),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Unversioned files carry the same fields as version 1.
fn migrate_v0_to_v1(mut scenario: ScenarioDef) -> Result<ScenarioDef, ProjectError> {
    scenario.version = 1;
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;

    #[test]
    fn unversioned_scenario_is_upgraded() {
        let mut s = presets::baseline();
        s.version = 0;
        let migrated = migrate_to_latest(s).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
    }

    #[test]
    fn latest_is_untouched() {
        let s = presets::hill();
        assert_eq!(migrate_to_latest(s.clone()).unwrap(), s);
    }
}
