use crate::api::GraphicsFilterModule;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;

/// Describe the filter called `name`, or every filter in name order.
pub fn run(module: &GraphicsFilterModule, name: Option<&str>) -> Result<CmdResult> {
    let filters = match name {
        Some(name) => vec![module.find_filter(name)?],
        None => module.filters(),
    };

    let mut result = CmdResult::default()
        .with_listed_filters(filters.iter().map(|filter| filter.describe()).collect());
    if result.listed_filters.is_empty() {
        result.add_message(CmdMessage::info("No graphics filters defined"));
    }
    Ok(result)
}
