use anyhow::Result;
use hfc_packing::{
    bin_packing::{
        parse_solution, slack_coefficients, solve_bin_packing, BinPackingModel, Qubo, QuboSolver,
    },
    BinPackingConfig, CargoBox, PackingError,
};
use hfc_utils::{dejsonify, jsonify};

fn three_boxes() -> Vec<CargoBox> {
    vec![
        CargoBox::new(1.0, 1.0, 1.0, 1.0).with_box_type("A"),
        CargoBox::new(2.0, 2.0, 2.0, 1.0).with_box_type("B"),
        CargoBox::new(1.0, 2.0, 3.0, 1.0).with_box_type("C"),
    ]
}

fn three_box_config() -> BinPackingConfig {
    BinPackingConfig {
        num_bins: 2,
        base_area_capacity: 6.0,
        volume_capacity: 10.0,
        penalty: None,
    }
}

// One 1x1x2 box, two bins that each hold exactly one such box.
fn single_box_model() -> BinPackingModel {
    let config = BinPackingConfig {
        num_bins: 2,
        base_area_capacity: 1.0,
        volume_capacity: 2.0,
        penalty: None,
    };
    BinPackingModel::build(&[CargoBox::new(1.0, 1.0, 2.0, 1.0)], &config).unwrap()
}

#[test]
fn test_build_orders_items_by_volume() {
    let model = BinPackingModel::build(&three_boxes(), &three_box_config()).unwrap();
    assert_eq!(model.items, vec![1, 2, 0]);
    assert_eq!(model.base_areas, vec![4.0, 2.0, 1.0]);
    assert_eq!(model.volumes, vec![8.0, 6.0, 1.0]);
    assert_eq!(
        model.variables,
        vec!["x0", "x1", "e0,0", "e0,1", "e0,2", "e1,0", "e1,1", "e1,2"]
    );
    assert_eq!(model.constraints.len(), 3 + 2 * 2);
    assert_eq!(model.item_var(1, 2), 7);
}

#[test]
fn test_export_as_lp_string() {
    let model = BinPackingModel::build(&three_boxes(), &three_box_config()).unwrap();
    let lp = model.export_as_lp_string();
    assert!(lp.starts_with("\\ Problem name: BinPacking\n"));
    assert!(lp.contains("Minimize\n obj: x0 + x1\nSubject To\n"));
    assert!(lp.contains(" assign0: e0,0 + e1,0 = 1\n"));
    assert!(lp.contains(" base0: 4 e0,0 + 2 e0,1 + e0,2 - 6 x0 <= 0\n"));
    assert!(lp.contains(" volume1: 8 e1,0 + 6 e1,1 + e1,2 - 10 x1 <= 0\n"));
    assert!(lp.contains("Binaries\n x0\n x1\n e0,0\n"));
    assert!(lp.ends_with("End\n"));
}

#[test]
fn test_build_errors() {
    let boxes = three_boxes();
    let no_bins = BinPackingConfig {
        num_bins: 0,
        ..three_box_config()
    };
    assert_eq!(
        BinPackingModel::build(&boxes, &no_bins),
        Err(PackingError::NoBins)
    );

    let no_base = BinPackingConfig {
        base_area_capacity: 0.0,
        ..three_box_config()
    };
    assert_eq!(
        BinPackingModel::build(&boxes, &no_base),
        Err(PackingError::NonPositiveCapacity {
            name: "base_area_capacity",
            value: 0.0
        })
    );

    let unbounded = BinPackingConfig {
        volume_capacity: f64::INFINITY,
        ..three_box_config()
    };
    assert!(matches!(
        BinPackingModel::build(&boxes, &unbounded),
        Err(PackingError::NonPositiveCapacity {
            name: "volume_capacity",
            ..
        })
    ));

    let flat = vec![CargoBox::new(1.0, 1.0, 0.0, 1.0)];
    assert!(matches!(
        BinPackingModel::build(&flat, &three_box_config()),
        Err(PackingError::NonPositiveBoxDimension { index: 0, .. })
    ));
}

#[test]
fn test_evaluate_solution() {
    let model = BinPackingModel::build(&three_boxes(), &three_box_config()).unwrap();
    // bin 0 holds B and A, bin 1 holds C
    let utilization = model
        .evaluate_solution(&[1, 1, 1, 0, 1, 0, 1, 0])
        .unwrap();
    assert_eq!(utilization.num_bins_used, 2);
    assert_eq!(utilization.bins[0].items, vec![1, 0]);
    assert_eq!(utilization.bins[0].base_area, 5.0);
    assert_eq!(utilization.bins[0].volume_ratio, 0.9);
    assert_eq!(utilization.bins[1].items, vec![2]);
    assert_eq!(utilization.bins[1].volume_ratio, 0.6);
}

#[test]
fn test_evaluate_solution_errors() {
    let model = BinPackingModel::build(&three_boxes(), &three_box_config()).unwrap();
    assert_eq!(
        model.evaluate_solution(&[1, 1]),
        Err(PackingError::SolutionLength {
            expected: 8,
            actual: 2
        })
    );
    assert_eq!(
        model.evaluate_solution(&[1, 1, 2, 0, 1, 0, 1, 0]),
        Err(PackingError::NonBinaryValue { index: 2, value: 2 })
    );
    assert_eq!(
        model.evaluate_solution(&[1, 1, 1, 0, 1, 1, 1, 0]),
        Err(PackingError::ItemNotAssignedOnce {
            item: 1,
            assignments: 2
        })
    );
    assert_eq!(
        model.evaluate_solution(&[1, 0, 1, 0, 1, 0, 1, 0]),
        Err(PackingError::ItemInUnusedBin { item: 2, bin: 1 })
    );
    assert!(matches!(
        model.evaluate_solution(&[1, 0, 1, 1, 1, 0, 0, 0]),
        Err(PackingError::CapacityExceeded { bin: 0, .. })
    ));
}

#[test]
fn test_slack_coefficients() {
    assert_eq!(slack_coefficients(0), Vec::<u64>::new());
    assert_eq!(slack_coefficients(1), vec![1]);
    assert_eq!(slack_coefficients(4), vec![1, 2, 1]);
    assert_eq!(slack_coefficients(7), vec![1, 2, 4]);
    let coefficients = slack_coefficients(2000);
    assert_eq!(coefficients.len(), 11);
    assert_eq!(coefficients.iter().sum::<u64>(), 2000);
}

#[test]
fn test_to_qubo_layout() {
    let model = single_box_model();
    let qubo = model.to_qubo().unwrap();
    assert_eq!(qubo.num_vars(), 10);
    assert_eq!(&qubo.variables[..4], &model.variables[..]);
    assert_eq!(qubo.variables[4], "base0@slack0");
    assert_eq!(qubo.variables[6], "volume0@slack1");
    assert_eq!(model.penalty(), 3.0);

    // feasible, one bin, all slack zero
    assert_eq!(qubo.evaluate(&[1, 0, 1, 0, 0, 0, 0, 0, 0, 0]).unwrap(), 1.0);
    // nothing assigned
    assert_eq!(qubo.evaluate(&[0; 10]).unwrap(), 3.0);
    assert!(qubo.evaluate(&[0; 4]).is_err());
}

#[test]
fn test_qubo_minimum_is_feasible() {
    let model = single_box_model();
    let qubo = model.to_qubo().unwrap();
    let n = qubo.num_vars();

    let mut best = (f64::INFINITY, Vec::new());
    for bits in 0u32..(1 << n) {
        let x: Vec<u8> = (0..n).map(|k| ((bits >> k) & 1) as u8).collect();
        let value = qubo.evaluate(&x).unwrap();
        if value < best.0 {
            best = (value, x);
        }
    }
    assert_eq!(best.0, 1.0);
    let utilization = model
        .evaluate_solution(&best.1[..model.num_variables()])
        .unwrap();
    assert_eq!(utilization.num_bins_used, 1);
}

#[test]
fn test_to_qubo_rejects_fractional_coefficients() {
    let mut cargo = CargoBox::new(1.0, 1.0, 1.0, 1.0);
    cargo.base_area = 1.5;
    let model = BinPackingModel::build(&[cargo], &three_box_config()).unwrap();
    assert_eq!(
        model.to_qubo(),
        Err(PackingError::NonIntegralConstraint {
            constraint: "base0".to_string()
        })
    );
}

#[test]
fn test_evaluate_full_solution() {
    let model = single_box_model();
    // slack bits after the model variables are dropped
    let utilization = model
        .evaluate_full_solution(&[1, 0, 1, 0, 0, 0, 0, 0, 0, 0])
        .unwrap();
    assert_eq!(utilization.num_bins_used, 1);
    assert_eq!(
        model.evaluate_full_solution(&[1, 0, 1, 0, 0]),
        Err(PackingError::SolutionLength {
            expected: 4,
            actual: 5
        })
    );

    // no qubo exists, so only the model length is accepted
    let mut cargo = CargoBox::new(1.0, 1.0, 1.0, 1.0);
    cargo.base_area = 1.5;
    let fractional = BinPackingModel::build(&[cargo], &three_box_config()).unwrap();
    assert_eq!(
        fractional.evaluate_full_solution(&[1; 7]),
        Err(PackingError::SolutionLength {
            expected: 4,
            actual: 7
        })
    );
    assert_eq!(
        fractional
            .evaluate_full_solution(&[1, 0, 1, 0])
            .unwrap()
            .num_bins_used,
        1
    );
}

#[test]
fn test_qubo_json() {
    let qubo = single_box_model().to_qubo().unwrap();
    let json = jsonify(&qubo).unwrap();
    assert!(json.contains(r#""quadratic":[["#));
    let restored: Qubo = dejsonify(&json).unwrap();
    assert_eq!(restored, qubo);

    let broken = r#"{"variables": ["a", "b"], "linear": [0, 0], "quadratic": [[0, 0]], "offset": 0}"#;
    assert!(dejsonify::<Qubo>(broken).is_err());
}

#[test]
fn test_parse_solution() {
    assert_eq!(parse_solution("[0, 1, 1.0]").unwrap(), vec![0, 1, 1]);
    assert_eq!(parse_solution(r#" {"x": [1, 0]} "#).unwrap(), vec![1, 0]);
    assert!(parse_solution("[0.5]").is_err());
    assert!(parse_solution("nope").is_err());
}

struct FixedSolver(Vec<u8>);

impl QuboSolver for FixedSolver {
    fn solve(&self, _qubo: &Qubo) -> Result<Vec<u8>> {
        Ok(self.0.clone())
    }
}

#[test]
fn test_solve_bin_packing_with_fixed_solver() {
    let model = single_box_model();
    let utilization =
        solve_bin_packing(&model, &FixedSolver(vec![0, 1, 0, 1, 0, 0, 0, 0, 0, 0])).unwrap();
    assert_eq!(utilization.num_bins_used, 1);
    assert_eq!(utilization.bins[1].items, vec![0]);
    assert_eq!(utilization.bins[1].volume_ratio, 1.0);

    assert!(solve_bin_packing(&model, &FixedSolver(vec![0, 1, 0, 1])).is_err());
}

#[cfg(unix)]
#[test]
fn test_command_solver() {
    use hfc_packing::bin_packing::CommandSolver;

    let model = single_box_model();
    let solver = CommandSolver::new(
        "sh",
        vec![
            "-c".to_string(),
            "cat > /dev/null; echo '{\"x\": [1, 0, 1, 0, 0, 0, 0, 0, 0, 0]}'".to_string(),
        ],
    );
    let utilization = solve_bin_packing(&model, &solver).unwrap();
    assert_eq!(utilization.num_bins_used, 1);
    assert_eq!(utilization.bins[0].items, vec![0]);

    let failing = CommandSolver::new("sh", vec!["-c".to_string(), "exit 3".to_string()]);
    assert!(solve_bin_packing(&model, &failing).is_err());
}
