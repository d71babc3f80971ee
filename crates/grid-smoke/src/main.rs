//! Grid Smoke Harness
//!
//! Lays out a single grid container from a stylesheet and prints the
//! resulting geometry as JSON. The container takes its style from the
//! `grid` rule; each item is styled by the rule named in `--items`.
//!
//! ```text
//! grid-smoke --css "grid { display: grid; grid-template-columns: 1fr 2fr } a { height: 20px }" \
//!     --items a,a,a --width 600
//! ```

use rustkit_css::{ComputedStyle, Stylesheet, UnitContext};
use rustkit_layout::{BoxId, BoxTree, FlowDispatcher, Rect};
use serde_json::json;
use tracing::{error, info};

/// Parse command line arguments
struct Args {
    css: Option<String>,
    css_file: Option<String>,
    items: Vec<String>,
    width: f32,
    height: f32,
    dpi: f32,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut css = None;
        let mut css_file = None;
        let mut items = Vec::new();
        let mut width = 800.0f32;
        let mut height = 600.0f32;
        let mut dpi = 96.0f32;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--css" => {
                    css = args.next();
                }
                "--css-file" => {
                    css_file = args.next();
                }
                "--items" => {
                    if let Some(val) = args.next() {
                        items = val
                            .split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(String::from)
                            .collect();
                    }
                }
                "--width" => {
                    if let Some(val) = args.next() {
                        width = val.parse().unwrap_or(800.0);
                    }
                }
                "--height" => {
                    if let Some(val) = args.next() {
                        height = val.parse().unwrap_or(600.0);
                    }
                }
                "--dpi" => {
                    if let Some(val) = args.next() {
                        dpi = val.parse().unwrap_or(96.0);
                    }
                }
                _ => {}
            }
        }

        Self {
            css,
            css_file,
            items,
            width,
            height,
            dpi,
        }
    }

    fn stylesheet_source(&self) -> std::io::Result<String> {
        match (&self.css, &self.css_file) {
            (Some(css), _) => Ok(css.clone()),
            (None, Some(path)) => std::fs::read_to_string(path),
            (None, None) => Ok(String::new()),
        }
    }
}

fn rect_json(rect: Rect) -> serde_json::Value {
    json!({
        "x": rect.x,
        "y": rect.y,
        "width": rect.width,
        "height": rect.height,
    })
}

fn run(args: &Args) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let sheet = Stylesheet::parse(&args.stylesheet_source()?)?;
    let ctx = UnitContext::new()
        .with_viewport(args.width, args.height)
        .with_dpi(args.dpi);

    let mut tree = BoxTree::new();
    let root = tree.insert_root(ComputedStyle::new());
    let grid_style = sheet.compute_style(|s| s == "grid", None)?;
    let grid = tree.append_child(root, grid_style.clone());
    let mut items: Vec<(String, BoxId)> = Vec::with_capacity(args.items.len());
    for selector in &args.items {
        let style = sheet.compute_style(|s| s == selector.as_str(), Some(&grid_style))?;
        items.push((selector.clone(), tree.append_child(grid, style)));
    }

    FlowDispatcher.layout_root(&mut tree, root, ctx.css_to_device(args.width), &ctx)?;

    let items: Vec<serde_json::Value> = items
        .iter()
        .map(|(selector, id)| {
            json!({
                "selector": selector,
                "box_type": format!("{:?}", tree[*id].box_type),
                "content": rect_json(tree[*id].dimensions.content),
                "border_box": rect_json(tree[*id].dimensions.border_box()),
            })
        })
        .collect();

    Ok(json!({
        "status": "ok",
        "viewport": { "width": args.width, "height": args.height, "dpi": args.dpi },
        "container": rect_json(tree[grid].dimensions.content),
        "items": items,
    }))
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!(
        css_file = ?args.css_file,
        items = args.items.len(),
        width = args.width,
        height = args.height,
        dpi = args.dpi,
        "Starting grid smoke harness"
    );

    match run(&args) {
        Ok(result) => println!("{}", result),
        Err(e) => {
            error!(%e, "Grid layout failed");
            println!("{}", json!({ "status": "error", "error": e.to_string() }));
            std::process::exit(1);
        }
    }
}
