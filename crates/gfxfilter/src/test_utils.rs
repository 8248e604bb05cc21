//! Fixtures shared by unit tests and, through the `test_utils` feature, by
//! downstream crates testing their scene code against real filters.

use std::cell::RefCell;
use std::rc::Rc;

use crate::api::GraphicsFilterModule;
use crate::change::{ChangeMessage, ListenerId};
use crate::filter::{Criterion, FilterDefinition, GraphicsFilter, Operator};
use crate::model::SceneGraphic;

/// A graphic with the given name and own visibility flag.
pub fn graphic(name: &str, visible: bool) -> SceneGraphic {
    SceneGraphic::new(name).with_visibility(visible)
}

/// Collects every change message a module delivers.
pub struct ChangeRecorder {
    messages: Rc<RefCell<Vec<ChangeMessage>>>,
    id: ListenerId,
}

impl ChangeRecorder {
    pub fn attach(module: &GraphicsFilterModule) -> Self {
        let messages = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&messages);
        let id = module.add_listener(move |message| sink.borrow_mut().push(message.clone()));
        Self { messages, id }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn messages(&self) -> Vec<ChangeMessage> {
        self.messages.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

/// A module pre-populated with managed, named filters.
pub struct ModuleFixture {
    pub module: GraphicsFilterModule,
}

impl Default for ModuleFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleFixture {
    pub fn new() -> Self {
        Self {
            module: GraphicsFilterModule::new(),
        }
    }

    pub fn with_leaf(self, name: &str, criterion: Criterion) -> Self {
        let filter = self
            .module
            .create_filter(Some(name), FilterDefinition::Leaf(criterion))
            .unwrap();
        filter.set_managed(true);
        self
    }

    /// Add an operator over already defined filters, all active.
    pub fn with_operator(self, name: &str, operator: Operator, operands: &[&str]) -> Self {
        let filter = self
            .module
            .create_filter(Some(name), FilterDefinition::Operator(operator))
            .unwrap();
        filter.set_managed(true);
        let view = filter.as_operator().unwrap();
        for operand in operands {
            view.append_operand(&self.filter(operand)).unwrap();
        }
        self
    }

    pub fn filter(&self, name: &str) -> GraphicsFilter {
        self.module.find_filter(name).unwrap()
    }
}
