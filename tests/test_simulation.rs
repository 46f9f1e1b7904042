#[cfg(test)]
mod test_simulation {
    use approx::assert_relative_eq;
    use peroxide::fuga::RK4;
    use surfkin::prelude::*;

    /// Fast-prefactor set whose fastest relaxation rate is ~1e12 per time unit.
    fn fast_prefactor_params() -> ParameterSet {
        ParameterSetBuilder::default()
            .a(1e13)
            .e1f(0.20)
            .e1r(0.60)
            .e2f(0.80)
            .e2r(1.00)
            .e3f(0.70)
            .e3r(0.90)
            .e4f(0.40)
            .e4r(1.20)
            .build()
            .unwrap()
    }

    fn short_setup() -> SteadyStateSetup {
        SteadyStateSetupBuilder::default()
            .t_final(5.0)
            .n_points(11)
            .build()
            .unwrap()
    }

    /// The baseline reaches a physical state with a positive turnover.
    #[test]
    fn test_baseline_steady_state() {
        // ARRANGE
        let params = ParameterSet::baseline();

        // ACT
        let result = integrate_to_steady_state(&params, 80.0).unwrap();

        // ASSERT
        let c = result.coverage;
        for theta in [c.co, c.o, c.co2, result.theta_star] {
            assert!((0.0..=1.0).contains(&theta), "coverage {theta} out of range");
        }
        assert_relative_eq!(c.co + c.o + c.co2 + result.theta_star, 1.0, epsilon = 1e-12);

        // Either converged within the horizon or extended exactly once
        assert!(result.converged || result.extended);
        if result.extended {
            assert_eq!(result.horizon, 160.0);
        } else {
            assert_eq!(result.horizon, 80.0);
        }

        assert!(result.tof(&params).unwrap() > 0.0);
    }

    /// Identical inputs give identical results.
    #[test]
    fn test_integration_is_deterministic() {
        let params = ParameterSet::baseline().at_temperature(650.0);
        let setup = short_setup();

        let first = simulate_to_steady_state(&params, &setup).unwrap();
        let second = simulate_to_steady_state(&params, &setup).unwrap();

        assert_eq!(first, second);
    }

    /// The residual reported is the max-norm of the derivatives at the result.
    #[test]
    fn test_residual_matches_terminal_derivatives() {
        let params = ParameterSet::baseline();
        let setup = SteadyStateSetupBuilder::default()
            .t_final(20.0)
            .extend_once(false)
            .build()
            .unwrap();

        let run = simulate_to_steady_state(&params, &setup).unwrap();
        let (t_end, terminal) = run.trajectory.terminal().unwrap();
        let system = SurfaceSystem::new(&params).unwrap();

        assert_relative_eq!(t_end, 20.0, max_relative = 1e-12);
        assert!(!run.result.extended);
        assert_relative_eq!(
            run.result.residual,
            system.residual(&terminal).unwrap(),
            max_relative = 1e-12
        );
    }

    /// Unphysical temperatures surface as invalid input, not as solver failures.
    #[test]
    fn test_zero_temperature_fails_before_integration() {
        let params = ParameterSet::baseline().at_temperature(0.0);

        let err = integrate_to_steady_state(&params, 80.0).unwrap_err();

        assert!(matches!(err, SimulationError::Kinetics(_)));
        assert_eq!(err.class(), ErrorClass::InvalidPhysicalInput);
    }

    #[test]
    fn test_invalid_horizon() {
        let err = integrate_to_steady_state(&ParameterSet::baseline(), -1.0).unwrap_err();

        assert!(matches!(err, SimulationError::InvalidHorizon(_)));
        assert_eq!(err.class(), ErrorClass::Configuration);
    }

    /// The trajectory is sampled on a uniform grid starting from the clean surface.
    #[test]
    fn test_trajectory_sampling() {
        let setup = short_setup();
        let run = simulate_to_steady_state(&ParameterSet::baseline(), &setup).unwrap();
        let trajectory = &run.trajectory;

        assert_eq!(trajectory.len(), 11);
        assert_eq!(trajectory.times[0], 0.0);
        assert_eq!(trajectory.states[0], CoverageState::vacant());
        assert_relative_eq!(
            trajectory.times[10],
            run.result.horizon,
            max_relative = 1e-12
        );

        let matrix = trajectory.to_matrix();
        assert_eq!(matrix.shape(), &[11, 5]);
        assert_relative_eq!(matrix[[0, 4]], 1.0);

        // CO adsorbs first on the clean surface
        assert!(trajectory.theta_co()[1] > 0.0);
    }

    /// An explicit integrator on the same grid agrees with the default one.
    #[test]
    fn test_explicit_integrator_agrees() {
        let params = ParameterSet::baseline();
        let setup = short_setup();

        let implicit = simulate_to_steady_state(&params, &setup).unwrap();
        let explicit = simulate_with(&params, &setup, &RK4).unwrap();

        let a = implicit.result.coverage;
        let b = explicit.result.coverage;
        assert_relative_eq!(a.co, b.co, epsilon = 1e-4);
        assert_relative_eq!(a.o, b.o, epsilon = 1e-4);
        assert_relative_eq!(a.co2, b.co2, epsilon = 1e-4);
    }

    /// The steady-state TOF is the desorption rate at the final coverages.
    #[test]
    fn test_steady_state_tof_is_r4() {
        let params = ParameterSet::baseline();
        let setup = SteadyStateSetup::analysis();

        let run = simulate_to_steady_state(&params, &setup).unwrap();
        let tof = steady_state_tof(&params, &setup).unwrap();

        assert_relative_eq!(tof, run.result.rates(&params).unwrap().r4);
        assert_relative_eq!(
            tof,
            tof_at(&run.result.coverage, &params).unwrap(),
            max_relative = 1e-12
        );
    }

    /// Baseline scenario at t_final = 80 against converged reference values.
    #[test]
    fn test_baseline_reference_values() {
        // ARRANGE
        let params = ParameterSet::baseline();

        // ACT
        let result = integrate_to_steady_state(&params, 80.0).unwrap();
        let tof = result.tof(&params).unwrap();

        // ASSERT
        assert_relative_eq!(tof, 9.40353235e-7, max_relative = 1e-4);
        assert_relative_eq!(result.coverage.co, 0.98794425, max_relative = 1e-4);
        assert_relative_eq!(result.coverage.o, 3.48939e-3, max_relative = 1e-4);
        assert_relative_eq!(result.coverage.co2, 7.1291e-4, max_relative = 1e-4);
        assert_relative_eq!(result.theta_star, 7.85345e-3, max_relative = 1e-4);
    }

    /// A state still unconverged after the extension is returned, flagged.
    #[test]
    fn test_unconverged_after_extension_is_ok() {
        let params = ParameterSet::baseline();
        let setup = SteadyStateSetup::analysis();

        let result = simulate_to_steady_state(&params, &setup).unwrap().result;

        assert!(result.extended);
        assert!(!result.converged);
        assert!(result.residual > setup.residual_tol);
        assert_eq!(result.horizon, 160.0);
    }

    /// A short horizon forces the single extension, which restarts from the
    /// clean surface over twice the horizon.
    #[test]
    fn test_short_horizon_is_extended_once() {
        // ARRANGE
        let params = ParameterSet::baseline();
        let setup = SteadyStateSetupBuilder::default()
            .t_final(1.0)
            .n_points(11)
            .build()
            .unwrap();
        let unextended = SteadyStateSetup {
            extend_once: false,
            ..setup.clone()
        };

        // ACT
        let run = simulate_to_steady_state(&params, &setup).unwrap();
        let single = simulate_to_steady_state(&params, &unextended).unwrap();

        // ASSERT
        assert!(run.result.extended);
        assert!(!run.result.converged);
        assert_eq!(run.result.horizon, 2.0);

        let trajectory = &run.trajectory;
        assert_eq!(trajectory.len(), 11);
        assert_eq!(trajectory.times[0], 0.0);
        assert_eq!(trajectory.states[0], CoverageState::vacant());
        assert_eq!(trajectory.terminal().unwrap().0, 2.0);

        // Sample 5 of the extended run lies at t = 1 and matches the end of an
        // unextended run, so the extension did not start from the t = 1 state
        assert!(!single.result.extended);
        assert_eq!(single.result.horizon, 1.0);
        let (_, at_one) = single.trajectory.terminal().unwrap();
        assert_relative_eq!(trajectory.times[5], 1.0, max_relative = 1e-12);
        assert_relative_eq!(trajectory.states[5].co, at_one.co, max_relative = 1e-6);
        assert_relative_eq!(trajectory.states[5].o, at_one.o, max_relative = 1e-6);
    }

    /// Rate constants near 1e12 per time unit are integrated without a
    /// step-size bound tied to the fastest relaxation time.
    #[test]
    fn test_fast_prefactor_set_reaches_steady_state() {
        // ARRANGE
        let params = fast_prefactor_params();
        let setup = SteadyStateSetup::default();
        let system = SurfaceSystem::new(&params).unwrap();
        assert!(system.stiffness_bound() > 1e11);

        // ACT
        let result = simulate_to_steady_state(&params, &setup).unwrap().result;
        let tof = result.tof(&params).unwrap();

        // ASSERT
        let c = result.coverage;
        for theta in [c.co, c.o, c.co2, result.theta_star] {
            assert!((0.0..=1.0).contains(&theta), "coverage {theta} out of range");
        }
        assert!(tof.is_finite());
        assert_relative_eq!(tof, 0.14530223, max_relative = 1e-5);
        assert_relative_eq!(c.co, 0.99956352, max_relative = 1e-6);
    }

    /// The fixed-step path refuses the fast-prefactor set instead of
    /// taking billions of steps.
    #[test]
    fn test_fixed_step_path_rejects_fast_prefactor_set() {
        let err = simulate_with(&fast_prefactor_params(), &SteadyStateSetup::default(), &RK4)
            .unwrap_err();

        assert_eq!(err.class(), ErrorClass::SolverDivergence);
    }
}
