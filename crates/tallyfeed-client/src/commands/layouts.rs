use crate::ClientResult;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{LayoutInfo, LayoutsData};
use crate::feed::layout::{ALL_LAYOUTS, Layout, RecordSelection};

pub fn run() -> ClientResult<SuccessEnvelope> {
    let layouts = ALL_LAYOUTS
        .iter()
        .map(|layout| layout_info(*layout))
        .collect::<Vec<LayoutInfo>>();
    success(
        "layouts",
        LayoutsData {
            default_layout: Layout::Deduplicated.slug().to_string(),
            layouts,
        },
    )
}

fn layout_info(layout: Layout) -> LayoutInfo {
    let records = match layout.selection() {
        RecordSelection::Everything => "all in-scope records",
        RecordSelection::ApiOnly => "api records only",
        RecordSelection::Deduplicated => "api records plus unmatched imported records",
    };
    LayoutInfo {
        name: layout.slug().to_string(),
        description: layout.description().to_string(),
        records: records.to_string(),
        newest_first: layout.sorts_newest_first(),
        file_stem: layout.file_stem().to_string(),
        columns: layout
            .columns()
            .iter()
            .map(|column| (*column).to_string())
            .collect(),
    }
}
