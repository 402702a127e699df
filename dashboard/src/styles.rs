mod global {
    turf::style_sheet!("assets/global.css");
}

mod header {
    turf::style_sheet!("assets/header.css");
}

mod forms {
    turf::style_sheet!("assets/forms.css");
}

mod links {
    turf::style_sheet!("assets/links.css");
}

mod charts {
    turf::style_sheet!("assets/charts.css");
}

pub use charts::ClassName as Charts;
pub use forms::ClassName as Forms;
pub use header::ClassName as Header;
pub use links::ClassName as Links;

use std::sync::LazyLock;

pub static ALL: LazyLock<String> = LazyLock::new(|| {
    [
        global::STYLE_SHEET,
        header::STYLE_SHEET,
        forms::STYLE_SHEET,
        links::STYLE_SHEET,
        charts::STYLE_SHEET,
    ]
    .join("\n")
});
