//! Create or update a filter in one step.
//!
//! A define request names the filter and optionally says what it is (one leaf
//! criterion or one operator), which operands to add or remove, and whether it
//! matches inversely. Defining a name that does not exist yet creates a
//! managed filter; defining an existing one updates it, but never changes its
//! kind or leaf criterion.
//!
//! All references are resolved and all compatibility checks run before
//! anything is touched. The mutations themselves run inside one change bracket,
//! so listeners see a single message, and on failure the operand list and
//! inverse flag are put back.

use crate::api::GraphicsFilterModule;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{FilterError, Result};
use crate::filter::{Criterion, FilterDefinition, GraphicsFilter, Operator};
use crate::model::{DomainType, GraphicType, RegionPath};
use crate::validation::validate_filter_name;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefineRequest {
    pub name: String,
    pub operator: Option<Operator>,
    pub add_filters: Vec<String>,
    pub remove_filters: Vec<String>,
    pub match_graphic_name: Option<String>,
    pub match_visibility_flags: bool,
    pub match_region_path: Option<RegionPath>,
    pub match_graphic_type: Option<GraphicType>,
    pub match_domain_type: Option<DomainType>,
    /// `None` keeps the current setting (normal match for new filters).
    pub inverse: Option<bool>,
}

impl DefineRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_added(mut self, operand: impl Into<String>) -> Self {
        self.add_filters.push(operand.into());
        self
    }

    pub fn with_removed(mut self, operand: impl Into<String>) -> Self {
        self.remove_filters.push(operand.into());
        self
    }

    pub fn with_graphic_name(mut self, name: impl Into<String>) -> Self {
        self.match_graphic_name = Some(name.into());
        self
    }

    pub fn with_visibility_flags(mut self) -> Self {
        self.match_visibility_flags = true;
        self
    }

    pub fn with_region_path(mut self, path: impl Into<RegionPath>) -> Self {
        self.match_region_path = Some(path.into());
        self
    }

    pub fn with_graphic_type(mut self, graphic_type: GraphicType) -> Self {
        self.match_graphic_type = Some(graphic_type);
        self
    }

    pub fn with_domain_type(mut self, domain_type: DomainType) -> Self {
        self.match_domain_type = Some(domain_type);
        self
    }

    pub fn with_inverse(mut self, inverse: bool) -> Self {
        self.inverse = Some(inverse);
        self
    }

    /// The single leaf criterion requested, if any.
    pub fn criterion(&self) -> Result<Option<Criterion>> {
        let mut criteria = Vec::new();
        if let Some(name) = &self.match_graphic_name {
            criteria.push(Criterion::GraphicName(name.clone()));
        }
        if self.match_visibility_flags {
            criteria.push(Criterion::VisibilityFlags);
        }
        if let Some(path) = &self.match_region_path {
            criteria.push(Criterion::Region(path.clone()));
        }
        if let Some(graphic_type) = self.match_graphic_type {
            criteria.push(Criterion::GraphicType(graphic_type));
        }
        if let Some(domain_type) = self.match_domain_type {
            criteria.push(Criterion::DomainType(domain_type));
        }
        if criteria.len() > 1 {
            return Err(FilterError::AmbiguousSpecification(self.name.clone()));
        }
        Ok(criteria.pop())
    }

    /// What the request asks the filter to be, if it says.
    pub fn definition(&self) -> Result<Option<FilterDefinition>> {
        match (self.criterion()?, self.operator) {
            (Some(_), Some(_)) => Err(FilterError::AmbiguousSpecification(self.name.clone())),
            (Some(criterion), None) => Ok(Some(FilterDefinition::Leaf(criterion))),
            (None, Some(operator)) => Ok(Some(FilterDefinition::Operator(operator))),
            (None, None) => Ok(None),
        }
    }

    fn changes_operands(&self) -> bool {
        !self.add_filters.is_empty() || !self.remove_filters.is_empty()
    }
}

pub fn run(module: &GraphicsFilterModule, request: &DefineRequest) -> Result<CmdResult> {
    validate_filter_name(&request.name)?;
    let definition = request.definition()?;
    let to_add = resolve(module, &request.add_filters)?;
    let to_remove = resolve(module, &request.remove_filters)?;

    let existing = module.find_by_name(&request.name);
    let kind = match (&existing, &definition) {
        (Some(filter), definition) => {
            check_compatible(filter, definition.as_ref())?;
            filter.kind()
        }
        (None, Some(definition)) => definition.kind(),
        (None, None) => return Err(FilterError::IncompleteDefinition(request.name.clone())),
    };
    if request.changes_operands() && !kind.is_operator() {
        return Err(FilterError::NotAnOperator {
            name: request.name.clone(),
            actual: kind,
        });
    }

    let _cache = module.change_cache();
    let (filter, created) = match existing {
        Some(filter) => (filter, false),
        None => {
            // Checked above: a missing filter always comes with a definition.
            let definition = definition
                .ok_or_else(|| FilterError::IncompleteDefinition(request.name.clone()))?;
            let filter = module.create_filter(Some(&request.name), definition)?;
            filter.set_managed(true);
            (filter, true)
        }
    };

    if let Err(e) = apply(&filter, request, &to_add, &to_remove) {
        if created {
            filter.set_managed(false);
        }
        return Err(e);
    }

    let mut result = CmdResult::default().with_affected_filters(vec![filter.describe()]);
    let verb = if created { "Defined" } else { "Updated" };
    result.add_message(CmdMessage::success(format!(
        "{} graphics filter: {}",
        verb,
        filter.name()
    )));
    Ok(result)
}

fn resolve(module: &GraphicsFilterModule, names: &[String]) -> Result<Vec<GraphicsFilter>> {
    names.iter().map(|name| module.find_filter(name)).collect()
}

fn check_compatible(filter: &GraphicsFilter, definition: Option<&FilterDefinition>) -> Result<()> {
    let Some(definition) = definition else {
        return Ok(());
    };
    let mismatch = || FilterError::KindMismatch {
        name: filter.name(),
        actual: filter.kind(),
        requested: definition.kind(),
    };
    if definition.kind() != filter.kind() {
        return Err(mismatch());
    }
    match definition {
        FilterDefinition::Leaf(criterion) if filter.criterion() != Some(criterion) => {
            Err(mismatch())
        }
        _ => Ok(()),
    }
}

fn apply(
    filter: &GraphicsFilter,
    request: &DefineRequest,
    to_add: &[GraphicsFilter],
    to_remove: &[GraphicsFilter],
) -> Result<()> {
    let inverse = filter.is_inverse();
    let Some(operator) = filter.as_operator() else {
        if let Some(inverse) = request.inverse {
            filter.set_inverse(inverse);
        }
        return Ok(());
    };

    let snapshot = operator.snapshot();
    let outcome = to_add
        .iter()
        .try_for_each(|operand| operator.append_operand(operand))
        .and_then(|()| {
            to_remove
                .iter()
                .try_for_each(|operand| operator.remove_operand(operand))
        });
    match outcome {
        Ok(()) => {
            if let Some(inverse) = request.inverse {
                filter.set_inverse(inverse);
            }
            Ok(())
        }
        Err(e) => {
            log::debug!(
                "define of '{}' failed, restoring operands: {}",
                filter.name(),
                e
            );
            operator.restore(snapshot);
            filter.set_inverse(inverse);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeFlags;
    use crate::filter::FilterKind;
    use crate::model::SceneGraphic;
    use crate::test_utils::ChangeRecorder;

    #[test]
    fn defines_managed_leaf() {
        let module = GraphicsFilterModule::new();
        let result = run(
            &module,
            &DefineRequest::new("circles").with_graphic_name("circle"),
        )
        .unwrap();

        assert_eq!(result.affected_filters.len(), 1);
        assert_eq!(
            result.affected_filters[0].to_string(),
            "circles normal_match match_graphic_name circle"
        );
        let filter = module.find_filter("circles").unwrap();
        assert!(filter.is_managed());
        assert!(filter.evaluate(&SceneGraphic::new("circle")));
    }

    #[test]
    fn defines_operator_with_operands() {
        let module = GraphicsFilterModule::new();
        run(&module, &DefineRequest::new("f1").with_graphic_name("circle")).unwrap();
        run(&module, &DefineRequest::new("f2").with_visibility_flags()).unwrap();

        let request = DefineRequest::new("or1")
            .with_operator(Operator::Or)
            .with_added("f1")
            .with_added("f2");
        let result = run(&module, &request).unwrap();

        assert_eq!(
            result.affected_filters[0].to_string(),
            "or1 normal_match operator_or add_filters f1 f2"
        );
    }

    #[test]
    fn updates_existing_filter() {
        let module = GraphicsFilterModule::new();
        run(&module, &DefineRequest::new("f1").with_graphic_name("a")).unwrap();
        run(&module, &DefineRequest::new("f2").with_graphic_name("b")).unwrap();
        run(
            &module,
            &DefineRequest::new("and").with_operator(Operator::And).with_added("f1"),
        )
        .unwrap();

        // operator may be omitted once the filter exists
        let result = run(
            &module,
            &DefineRequest::new("and")
                .with_added("f2")
                .with_removed("f1")
                .with_inverse(true),
        )
        .unwrap();

        assert_eq!(result.messages[0].content, "Updated graphics filter: and");
        assert_eq!(
            result.affected_filters[0].to_string(),
            "and inverse_match operator_and add_filters f2"
        );
    }

    #[test]
    fn rejects_two_criteria() {
        let module = GraphicsFilterModule::new();
        let request = DefineRequest::new("f")
            .with_graphic_name("a")
            .with_visibility_flags();

        assert_eq!(
            run(&module, &request).unwrap_err(),
            FilterError::AmbiguousSpecification("f".into())
        );
        assert!(module.find_by_name("f").is_none());
    }

    #[test]
    fn rejects_criterion_with_operator() {
        let module = GraphicsFilterModule::new();
        let request = DefineRequest::new("f")
            .with_region_path("/heart")
            .with_operator(Operator::Or);

        assert!(matches!(
            run(&module, &request),
            Err(FilterError::AmbiguousSpecification(_))
        ));
    }

    #[test]
    fn rejects_kind_change() {
        let module = GraphicsFilterModule::new();
        run(&module, &DefineRequest::new("f").with_operator(Operator::And)).unwrap();

        let err = run(&module, &DefineRequest::new("f").with_graphic_name("x")).unwrap_err();
        assert_eq!(
            err,
            FilterError::KindMismatch {
                name: "f".into(),
                actual: FilterKind::And,
                requested: FilterKind::GraphicName,
            }
        );
        let err = run(&module, &DefineRequest::new("f").with_operator(Operator::Or)).unwrap_err();
        assert!(matches!(err, FilterError::KindMismatch { .. }));
        assert_eq!(module.find_filter("f").unwrap().kind(), FilterKind::And);
    }

    #[test]
    fn rejects_criterion_change_on_leaf() {
        let module = GraphicsFilterModule::new();
        run(&module, &DefineRequest::new("f").with_graphic_name("a")).unwrap();

        assert!(matches!(
            run(&module, &DefineRequest::new("f").with_graphic_name("b")),
            Err(FilterError::KindMismatch { .. })
        ));
        // same criterion is fine
        run(
            &module,
            &DefineRequest::new("f").with_graphic_name("a").with_inverse(true),
        )
        .unwrap();
        assert!(module.find_filter("f").unwrap().is_inverse());
    }

    #[test]
    fn rejects_operands_on_leaf() {
        let module = GraphicsFilterModule::new();
        run(&module, &DefineRequest::new("leaf").with_visibility_flags()).unwrap();
        run(&module, &DefineRequest::new("other").with_visibility_flags()).unwrap();

        assert_eq!(
            run(&module, &DefineRequest::new("leaf").with_added("other")).unwrap_err(),
            FilterError::NotAnOperator {
                name: "leaf".into(),
                actual: FilterKind::VisibilityFlags,
            }
        );
        // a new leaf cannot take operands either, and is not kept
        let request = DefineRequest::new("fresh")
            .with_graphic_name("x")
            .with_removed("other");
        assert!(matches!(
            run(&module, &request),
            Err(FilterError::NotAnOperator { .. })
        ));
        assert!(module.find_by_name("fresh").is_none());
    }

    #[test]
    fn new_filter_needs_a_definition() {
        let module = GraphicsFilterModule::new();
        assert_eq!(
            run(&module, &DefineRequest::new("empty")).unwrap_err(),
            FilterError::IncompleteDefinition("empty".into())
        );
    }

    #[test]
    fn unknown_operand_fails_before_creating() {
        let module = GraphicsFilterModule::new();
        let request = DefineRequest::new("or1")
            .with_operator(Operator::Or)
            .with_added("missing");

        assert_eq!(
            run(&module, &request).unwrap_err(),
            FilterError::NotFound("missing".into())
        );
        assert!(module.find_by_name("or1").is_none());
    }

    #[test]
    fn failure_restores_operands_and_inverse() {
        let module = GraphicsFilterModule::new();
        run(&module, &DefineRequest::new("a").with_graphic_name("a")).unwrap();
        run(&module, &DefineRequest::new("b").with_graphic_name("b")).unwrap();
        run(
            &module,
            &DefineRequest::new("and").with_operator(Operator::And).with_added("a"),
        )
        .unwrap();

        // b goes in, then adding the filter to itself fails
        let request = DefineRequest::new("and")
            .with_added("b")
            .with_added("and")
            .with_inverse(true);
        assert!(matches!(
            run(&module, &request),
            Err(FilterError::CycleRejected { .. })
        ));

        let and = module.find_filter("and").unwrap();
        assert_eq!(and.describe().to_string(), "and normal_match operator_and add_filters a");
    }

    #[test]
    fn failed_update_is_not_reported() {
        let module = GraphicsFilterModule::new();
        run(&module, &DefineRequest::new("a").with_graphic_name("a")).unwrap();
        run(&module, &DefineRequest::new("b").with_graphic_name("b")).unwrap();
        run(
            &module,
            &DefineRequest::new("and").with_operator(Operator::And).with_added("a"),
        )
        .unwrap();
        let recorder = ChangeRecorder::attach(&module);

        let request = DefineRequest::new("and").with_added("b").with_added("and");
        assert!(run(&module, &request).is_err());
        assert!(recorder.is_empty());

        // a later real change still goes out
        run(&module, &DefineRequest::new("and").with_added("b")).unwrap();
        assert_eq!(recorder.len(), 1);
        assert_eq!(
            recorder.messages()[0].change_for("and"),
            Some(ChangeFlags::RESULT)
        );
    }

    #[test]
    fn failed_new_filter_is_not_kept() {
        let module = GraphicsFilterModule::new();
        run(&module, &DefineRequest::new("a").with_graphic_name("a")).unwrap();
        let recorder = ChangeRecorder::attach(&module);

        // removing an operand the new filter never had
        let request = DefineRequest::new("or1")
            .with_operator(Operator::Or)
            .with_removed("a");
        assert!(matches!(
            run(&module, &request),
            Err(FilterError::OperandNotFound { .. })
        ));
        assert!(module.find_by_name("or1").is_none());
        assert!(recorder.is_empty());
    }

    #[test]
    fn define_delivers_one_message() {
        let module = GraphicsFilterModule::new();
        run(&module, &DefineRequest::new("a").with_graphic_name("a")).unwrap();
        run(&module, &DefineRequest::new("b").with_graphic_name("b")).unwrap();
        let recorder = ChangeRecorder::attach(&module);

        let request = DefineRequest::new("or1")
            .with_operator(Operator::Or)
            .with_added("a")
            .with_added("b")
            .with_inverse(true);
        run(&module, &request).unwrap();

        let messages = recorder.messages();
        assert_eq!(messages.len(), 1);
        let flags = messages[0].change_for("or1").unwrap();
        assert!(flags.contains(ChangeFlags::ADD | ChangeFlags::RESULT | ChangeFlags::NOT_RESULT));
    }

    #[test]
    fn invalid_name_is_rejected() {
        let module = GraphicsFilterModule::new();
        assert!(matches!(
            run(&module, &DefineRequest::new("a b").with_visibility_flags()),
            Err(FilterError::InvalidName { .. })
        ));
    }
}
