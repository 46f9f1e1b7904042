#[cfg(test)]
mod test_kinetics {
    use approx::assert_relative_eq;
    use peroxide::fuga::ODEProblem;
    use surfkin::prelude::*;

    /// A non-positive temperature is rejected before any rate is evaluated.
    #[test]
    fn test_zero_temperature_is_invalid_input() {
        let params = ParameterSet::baseline().at_temperature(0.0);

        let err = evaluate_rates(&CoverageState::vacant(), &params).unwrap_err();

        assert_eq!(err, KineticsError::NonPositiveTemperature(0.0));
        assert_eq!(err.class(), ErrorClass::InvalidPhysicalInput);
        assert!(arrhenius(1e3, 0.5, -10.0).is_err());
    }

    /// On the clean surface without CO2 in the gas phase nothing desorbs.
    #[test]
    fn test_clean_surface_has_zero_tof() {
        let params = ParameterSet::baseline();
        let rates = evaluate_rates(&CoverageState::vacant(), &params).unwrap();

        assert_eq!(rates.r4, 0.0);
        assert_eq!(rates.r3, 0.0);
        assert!(rates.r1 > 0.0);
        assert!(rates.r2 > 0.0);
        assert_eq!(tof_at(&CoverageState::vacant(), &params).unwrap(), 0.0);
    }

    /// Every rate constant grows with temperature for positive barriers.
    #[test]
    fn test_rate_constants_increase_with_temperature() {
        let params = ParameterSet::baseline();
        let cold = RateConstants::from_params(&params.at_temperature(500.0)).unwrap();
        let hot = RateConstants::from_params(&params.at_temperature(700.0)).unwrap();

        for barrier in Barrier::ALL {
            assert!(
                hot.get(barrier) > cold.get(barrier),
                "{barrier} does not increase with temperature"
            );
        }
    }

    /// A zero barrier leaves the bare prefactor.
    #[test]
    fn test_prefactor_override_is_used() {
        let params = ParameterSetBuilder::default()
            .e1f(0.0)
            .a1(42.0)
            .build()
            .unwrap();

        let constants = RateConstants::from_params(&params).unwrap();

        assert_relative_eq!(constants.get(Barrier::E1f), 42.0);
        assert_relative_eq!(
            constants.get(Barrier::E2f),
            arrhenius(params.a, params.e2f, params.t).unwrap()
        );
    }

    /// The derivative function is the net mass balance of the four steps.
    #[test]
    fn test_derivatives_match_step_rates() {
        let params = ParameterSet::baseline();
        let state = CoverageState::new(0.3, 0.2, 0.1);

        let rates = evaluate_rates(&state, &params).unwrap();
        let [d_co, d_o, d_co2] = coverage_derivatives(0.0, &state, &params).unwrap();

        assert_relative_eq!(d_co, rates.r1 - rates.r3, max_relative = 1e-12);
        assert_relative_eq!(d_o, 2.0 * rates.r2 - rates.r3, max_relative = 1e-12);
        assert_relative_eq!(d_co2, rates.r3 - rates.r4, max_relative = 1e-12);
    }

    /// The ODE problem seen by the integrator agrees with the plain function.
    #[test]
    fn test_ode_problem_agrees_with_derivatives() {
        let params = ParameterSet::baseline().at_temperature(650.0);
        let system = SurfaceSystem::new(&params).unwrap();
        let state = CoverageState::new(0.5, 0.1, 0.05);

        let mut dy = vec![0.0; 3];
        system.rhs(1.0, &state.to_array(), &mut dy).unwrap();

        let expected = coverage_derivatives(1.0, &state, &params).unwrap();
        for (got, want) in dy.iter().zip(expected.iter()) {
            assert_relative_eq!(*got, *want, max_relative = 1e-12);
        }
    }

    /// Overfilled surfaces beyond the rounding tolerance are rejected.
    #[test]
    fn test_overfilled_surface_is_rejected() {
        let params = ParameterSet::baseline();

        let err = evaluate_rates(&CoverageState::new(0.7, 0.5, 0.0), &params).unwrap_err();
        assert!(matches!(err, KineticsError::UnphysicalCoverage { .. }));

        // Within the tolerance the vacancy is clamped to zero
        let state = CoverageState::new(0.6, 0.4 + 5e-9, 0.0);
        assert!(evaluate_rates(&state, &params).is_ok());
    }
}
