/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Trajectory validation

use super::model::Trajectory;

/// Check a trajectory, returning one message per problem
///
/// An empty list means the trajectory is valid.
pub fn validate_trajectory(trajectory: &Trajectory) -> Vec<String> {
    let mut errors = Vec::new();

    if trajectory.frames.is_empty() {
        errors.push("Trajectory must have at least one frame".to_string());
        return errors;
    }

    for (idx, frame) in trajectory.frames.iter().enumerate() {
        match &frame.structure {
            None => errors.push(format!("Frame {} missing structure", idx)),
            Some(structure) if structure.sites.is_empty() => {
                errors.push(format!("Frame {} structure has no sites", idx))
            }
            Some(_) => {}
        }
        if !frame.step.is_some_and(f64::is_finite) {
            errors.push(format!("Frame {} missing or invalid step number", idx));
        }
    }

    if !errors.is_empty() {
        log::debug!("Trajectory validation found {} problem(s)", errors.len());
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::{Site, Structure};
    use crate::trajectory::TrajectoryFrame;

    #[test]
    fn test_no_frames() {
        assert_eq!(
            validate_trajectory(&Trajectory::default()),
            vec!["Trajectory must have at least one frame".to_string()]
        );
    }

    #[test]
    fn test_frame_problems_in_order() {
        let good = TrajectoryFrame::new(
            Structure::molecule(vec![Site::single("H", [0.0; 3], [0.0; 3], "H1")]),
            0.0,
        );
        let missing = TrajectoryFrame::default();
        let mut nan_step = good.clone();
        nan_step.step = Some(f64::NAN);

        let errors = validate_trajectory(&Trajectory::new(vec![good, missing, nan_step]));
        assert_eq!(
            errors,
            vec![
                "Frame 1 missing structure".to_string(),
                "Frame 1 missing or invalid step number".to_string(),
                "Frame 2 missing or invalid step number".to_string(),
            ]
        );
    }
}
