use gfxfilter::api::GraphicsFilterModule;
use gfxfilter::commands::DefineRequest;
use gfxfilter::filter::Operator;
use gfxfilter::model::{DomainType, GraphicType, SceneGraphic};
use gfxfilter::{FilterError, GraphicsFilter};

fn setup() -> (GraphicsFilterModule, GraphicsFilter) {
    let module = GraphicsFilterModule::new();
    module
        .define(&DefineRequest::new("f1").with_graphic_name("circle"))
        .unwrap();
    module
        .define(&DefineRequest::new("f2").with_visibility_flags())
        .unwrap();
    module
        .define(
            &DefineRequest::new("or1")
                .with_operator(Operator::Or)
                .with_added("f1")
                .with_added("f2"),
        )
        .unwrap();
    let or1 = module.find_filter("or1").unwrap();
    (module, or1)
}

#[test]
fn test_or_of_name_and_visibility() {
    let (_module, or1) = setup();

    let hidden_circle = SceneGraphic::new("circle").with_visibility(false);
    let visible_square = SceneGraphic::new("square");
    let hidden_square = SceneGraphic::new("square").with_visibility(false);

    assert!(or1.evaluate(&hidden_circle));
    assert!(or1.evaluate(&visible_square));
    assert!(!or1.evaluate(&hidden_square));

    or1.set_inverse(true);
    assert!(!or1.evaluate(&hidden_circle));
    assert!(!or1.evaluate(&visible_square));
    assert!(or1.evaluate(&hidden_square));
}

#[test]
fn test_disabling_operand() {
    let (module, or1) = setup();
    let f1 = module.find_filter("f1").unwrap();
    let op = or1.as_operator().unwrap();

    op.set_operand_active(&f1, false).unwrap();
    assert!(!or1.evaluate(&SceneGraphic::new("circle").with_visibility(false)));
    assert!(!op.operand_is_active(&f1).unwrap());

    op.set_operand_active(&f1, true).unwrap();
    assert!(or1.evaluate(&SceneGraphic::new("circle").with_visibility(false)));
}

#[test]
fn test_nested_operators() {
    let (module, or1) = setup();
    module
        .define(&DefineRequest::new("lines").with_graphic_type(GraphicType::Lines))
        .unwrap();
    module
        .define(&DefineRequest::new("on_mesh2d").with_domain_type(DomainType::Mesh2d))
        .unwrap();
    module
        .define(
            &DefineRequest::new("and1")
                .with_operator(Operator::And)
                .with_added("or1")
                .with_added("lines")
                .with_added("on_mesh2d"),
        )
        .unwrap();
    let and1 = module.find_filter("and1").unwrap();

    let graphic = SceneGraphic::new("circle")
        .with_graphic_type(GraphicType::Lines)
        .with_domain_type(DomainType::Mesh2d);
    assert!(and1.evaluate(&graphic));
    assert!(!and1.evaluate(&graphic.clone().with_graphic_type(GraphicType::Points)));
    assert!(!and1.evaluate(&graphic.with_domain_type(DomainType::Nodes)));

    // or1 is part of and1 now, so the reverse edge is refused
    let err = or1.as_operator().unwrap().append_operand(&and1).unwrap_err();
    assert!(matches!(err, FilterError::CycleRejected { .. }));
    assert_eq!(or1.as_operator().unwrap().len(), 2);
}

#[test]
fn test_region_filter_in_composite() {
    let module = GraphicsFilterModule::new();
    let heart = module.create_region_filter("/heart");
    let visible = module.create_visibility_flags_filter();
    let and = module.create_and_filter();
    let op = and.as_operator().unwrap();
    op.append_operand(&heart).unwrap();
    op.append_operand(&visible).unwrap();

    assert!(and.evaluate(&SceneGraphic::new("a").with_region("/heart/left")));
    assert!(!and.evaluate(&SceneGraphic::new("a").with_region("/lungs")));
    assert!(!and.evaluate(
        &SceneGraphic::new("a")
            .with_region("/heart")
            .with_scene_visibility(vec![false])
    ));
}

#[test]
fn test_list_describes_all() {
    let (module, _or1) = setup();
    let result = module.list(None).unwrap();
    let lines: Vec<String> = result
        .listed_filters
        .iter()
        .map(ToString::to_string)
        .collect();

    assert_eq!(
        lines,
        [
            "f1 normal_match match_graphic_name circle",
            "f2 normal_match match_visibility_flags",
            "or1 normal_match operator_or add_filters f1 f2",
        ]
    );
}
