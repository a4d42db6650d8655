//! Canonical level order and binding of initial occupations.
//!
//! Positional occupations are addressed against the order produced here, so
//! callers and engine must agree on it: energy descending, ties kept in the
//! order the levels arrived in.

use crate::common::config::KeyedOccupation;
use crate::domain::{CascadeError, CascadeResult, LevelList};

/// Sorts `levels` by energy (highest first) and assigns each
/// `(position, occupation)` pair, `position` being 1-based into the sorted
/// order. Unaddressed levels keep their occupation.
pub fn sort_by_energy(
    mut levels: LevelList,
    initial_occupations: &[(usize, f64)],
) -> CascadeResult<LevelList> {
    levels.sort_by_energy_descending();

    for &(position, occupation) in initial_occupations {
        validate_occupation(occupation)?;
        let level_count = levels.len();
        let level = position
            .checked_sub(1)
            .and_then(|index| levels.level_at_mut(index))
            .ok_or_else(|| {
                CascadeError::input_validation(
                    "INPUT.OCCUPATION_POSITION",
                    format!(
                        "initial occupation position {} is outside 1..={}",
                        position, level_count
                    ),
                )
            })?;
        level.relative_occ = occupation;
    }

    Ok(levels)
}

/// Assigns occupations by identity key. Nothing is written unless every key
/// resolves.
pub fn bind_occupations_by_key(
    levels: &mut LevelList,
    occupations: &[KeyedOccupation],
) -> CascadeResult<()> {
    for entry in occupations {
        validate_occupation(entry.occupation)?;
        levels.position_of(&entry.key())?;
    }
    for entry in occupations {
        levels.set_occupation(&entry.key(), entry.occupation)?;
    }
    Ok(())
}

fn validate_occupation(occupation: f64) -> CascadeResult<()> {
    if (0.0..=1.0).contains(&occupation) {
        Ok(())
    } else {
        Err(CascadeError::input_validation(
            "INPUT.OCCUPATION_VALUE",
            format!("initial occupation {occupation} is outside [0, 1]"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{bind_occupations_by_key, sort_by_energy};
    use crate::common::config::KeyedOccupation;
    use crate::domain::{AngularMomentum, CascadeFault, Level, LevelList, Parity};
    use crate::modules::fixtures::key;

    fn unsorted() -> LevelList {
        [1.0, 9.0, -3.0, 4.0]
            .into_iter()
            .map(|energy| Level::new(key(energy, 2), 0.0))
            .collect()
    }

    #[test]
    fn positions_address_the_sorted_order() {
        let levels = sort_by_energy(unsorted(), &[(1, 0.6), (3, 0.4)]).unwrap();

        let rows: Vec<(f64, f64)> = levels
            .iter()
            .map(|level| (level.energy(), level.relative_occ))
            .collect();
        assert_eq!(rows, vec![(9.0, 0.6), (4.0, 0.0), (1.0, 0.4), (-3.0, 0.0)]);
    }

    #[test]
    fn out_of_range_positions_are_rejected() {
        for position in [0, 5] {
            let error = sort_by_energy(unsorted(), &[(position, 1.0)])
                .expect_err("position should be rejected");
            assert_eq!(error.placeholder(), "INPUT.OCCUPATION_POSITION");
        }

        let error = sort_by_energy(unsorted(), &[(1, 1.5)]).expect_err("occupation above one");
        assert_eq!(error.placeholder(), "INPUT.OCCUPATION_VALUE");
    }

    #[test]
    fn keyed_binding_is_all_or_nothing() {
        let mut levels = sort_by_energy(unsorted(), &[]).unwrap();
        let present = KeyedOccupation {
            energy: 4.0,
            two_j: AngularMomentum::from_twice(1),
            parity: Parity::Even,
            electron_count: 2,
            occupation: 1.0,
        };
        let absent = KeyedOccupation {
            electron_count: 7,
            ..present
        };

        let error = bind_occupations_by_key(&mut levels, &[present, absent])
            .expect_err("absent key should fail");
        assert!(matches!(error.fault(), Some(CascadeFault::LevelNotFound(_))));
        assert_eq!(levels.total_occupation(), 0.0);

        bind_occupations_by_key(&mut levels, &[present]).unwrap();
        assert_eq!(levels.find(&key(4.0, 2)).unwrap().relative_occ, 1.0);
    }
}
