//! Embedded tera templates for the chart and the upload page.

use once_cell::sync::OnceCell;
use serde::Serialize;
use tera::{Context, Tera};

pub const CHART_TEMPLATE: &str = "chart.svg";
pub const PAGE_TEMPLATE: &str = "index.html";

static ENGINE: OnceCell<Tera> = OnceCell::new();

pub fn engine() -> tera::Result<&'static Tera> {
    ENGINE.get_or_try_init(|| {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (CHART_TEMPLATE, include_str!("../templates/chart.svg")),
            (PAGE_TEMPLATE, include_str!("../templates/index.html")),
        ])?;
        Ok(tera)
    })
}

pub fn render<T: Serialize>(template: &str, view: &T) -> tera::Result<String> {
    let context = Context::from_serialize(view)?;
    engine()?.render(template, &context)
}
