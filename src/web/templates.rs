//! Template rendering with Tera

use crate::search::SearchSnapshot;
use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

/// One row of the sales history table
#[derive(Debug, Serialize)]
struct SaleRow<'a> {
    price: String,
    sold_date: &'a str,
    link_url: &'a str,
}

/// Template renderer
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Create a new template renderer with embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            ("index.html", include_str!("../templates/index.html")),
            (
                "components/suggestions.html",
                include_str!("../templates/components/suggestions.html"),
            ),
            (
                "components/card_group.html",
                include_str!("../templates/components/card_group.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with a Tera Context
    pub fn render_with_context(&self, template: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template, context)?)
    }

    /// Context for the search page
    pub fn index_context(instance_name: &str, snapshot: &SearchSnapshot) -> Context {
        let mut ctx = Context::new();
        ctx.insert("instance_name", instance_name);
        ctx.insert("snapshot", snapshot);

        if let Some(group) = &snapshot.selected_card_group {
            let sales: Vec<SaleRow<'_>> = group
                .sold_cards
                .iter()
                .map(|sale| SaleRow {
                    price: sale.display_price(),
                    sold_date: &sale.sold_date,
                    link_url: &sale.link_url,
                })
                .collect();
            ctx.insert("sale_count", &group.sale_count());
            ctx.insert("sales", &sales);
        }
        ctx
    }
}
