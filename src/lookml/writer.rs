//! LookML rendering for views and explores.
//!
//! Output uses the colonless block form (`view orders {`) with two-space
//! indentation. Every string it writes can be read back by [`super::parse`].

use crate::model::{Dimension, DimensionGroup, Explore, Join, Measure, Namespace, View};

/// Escape a string for use in a LookML string literal.
#[must_use]
pub fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            c => result.push(c),
        }
    }
    result
}

/// Quote a string literal with double quotes.
#[must_use]
pub fn quote_string(s: &str) -> String {
    format!("\"{}\"", escape_string(s))
}

/// A writer that manages indentation for LookML output.
struct IndentWriter {
    buffer: String,
    current_indent: usize,
}

impl IndentWriter {
    const INDENT: &'static str = "  ";

    fn new() -> Self {
        Self {
            buffer: String::new(),
            current_indent: 0,
        }
    }

    fn indent(&mut self) {
        self.current_indent += 1;
    }

    fn dedent(&mut self) {
        self.current_indent = self.current_indent.saturating_sub(1);
    }

    fn write_line(&mut self, s: &str) {
        for _ in 0..self.current_indent {
            self.buffer.push_str(Self::INDENT);
        }
        self.buffer.push_str(s);
        self.buffer.push('\n');
    }

    fn blank_line(&mut self) {
        self.buffer.push('\n');
    }

    fn open(&mut self, header: &str) {
        self.write_line(&format!("{} {{", header));
        self.indent();
    }

    fn close(&mut self) {
        self.dedent();
        self.write_line("}");
    }

    fn opt_string(&mut self, key: &str, value: Option<&str>) {
        if let Some(v) = value {
            self.write_line(&format!("{}: {}", key, quote_string(v)));
        }
    }

    fn opt_word(&mut self, key: &str, value: Option<&str>) {
        if let Some(v) = value {
            self.write_line(&format!("{}: {}", key, v));
        }
    }

    fn flag(&mut self, key: &str, set: bool) {
        if set {
            self.write_line(&format!("{}: yes", key));
        }
    }

    fn list(&mut self, key: &str, items: &[String]) {
        if !items.is_empty() {
            self.write_line(&format!("{}: [{}]", key, items.join(", ")));
        }
    }

    /// Expression fields end in `;;`; multi-line SQL gets its own block.
    fn expr(&mut self, key: &str, sql: Option<&str>) {
        let Some(sql) = sql else { return };
        if sql.contains('\n') {
            self.write_line(&format!("{}:", key));
            self.indent();
            for line in sql.lines() {
                self.write_line(line);
            }
            self.dedent();
            self.write_line(";;");
        } else {
            self.write_line(&format!("{}: {} ;;", key, sql));
        }
    }

    fn into_string(self) -> String {
        self.buffer
    }
}

/// Render a view as LookML.
pub fn render_view(view: &View) -> String {
    let mut w = IndentWriter::new();
    w.open(&format!("view {}", view.name));

    w.opt_string("label", view.label.as_deref());
    w.opt_string("description", view.description.as_deref());
    w.expr("sql_table_name", view.sql_table_name.as_deref());
    if let Some(derived) = &view.derived_table {
        w.open("derived_table:");
        w.expr("sql", derived.sql.as_deref());
        w.close();
    }
    w.list("extends", &view.extends);
    w.list("drill_fields", &view.drill_fields);

    for dimension in &view.dimensions {
        write_dimension(&mut w, dimension);
    }
    for group in &view.dimension_groups {
        write_dimension_group(&mut w, group);
    }
    for measure in &view.measures {
        write_measure(&mut w, measure);
    }

    w.close();
    w.into_string()
}

fn write_dimension(w: &mut IndentWriter, dimension: &Dimension) {
    w.open(&format!("dimension: {}", dimension.name));
    w.opt_string("label", dimension.label.as_deref());
    w.opt_string("description", dimension.description.as_deref());
    w.opt_word("type", dimension.field_type.as_deref());
    w.list("tiers", &dimension.tiers);
    w.flag("primary_key", dimension.primary_key);
    w.expr("sql", dimension.sql.as_deref());
    w.flag("hidden", dimension.hidden);
    w.close();
}

fn write_dimension_group(w: &mut IndentWriter, group: &DimensionGroup) {
    w.open(&format!("dimension_group: {}", group.name));
    w.opt_string("label", group.label.as_deref());
    w.opt_string("description", group.description.as_deref());
    w.opt_word("type", group.field_type.as_deref());
    w.list("timeframes", &group.timeframes);
    w.expr("sql", group.sql.as_deref());
    w.flag("hidden", group.hidden);
    w.close();
}

fn write_measure(w: &mut IndentWriter, measure: &Measure) {
    w.open(&format!("measure: {}", measure.name));
    w.opt_string("label", measure.label.as_deref());
    w.opt_string("description", measure.description.as_deref());
    w.opt_word("type", measure.field_type.as_deref());
    w.expr("sql", measure.sql.as_deref());
    w.list("drill_fields", &measure.drill_fields);
    w.flag("hidden", measure.hidden);
    w.close();
}

/// Render an explore as LookML, preceded by `include:` lines.
pub fn render_explore(explore: &Explore, includes: &[String]) -> String {
    let mut w = IndentWriter::new();
    for include in includes {
        w.write_line(&format!("include: {}", quote_string(include)));
    }
    if !includes.is_empty() {
        w.blank_line();
    }

    w.open(&format!("explore {}", explore.name));
    w.opt_string("label", explore.label.as_deref());
    w.opt_string("description", explore.description.as_deref());
    w.flag("hidden", explore.hidden);
    w.opt_word("view_name", explore.view_name.as_deref());
    w.opt_word("from", explore.from.as_deref());
    for join in &explore.joins {
        write_join(&mut w, join);
    }
    w.close();
    w.into_string()
}

fn write_join(w: &mut IndentWriter, join: &Join) {
    w.open(&format!("join: {}", join.name));
    w.opt_string("view_label", join.view_label.as_deref());
    w.opt_word("from", join.from.as_deref());
    w.opt_word("type", join.join_type.as_deref());
    w.opt_word("relationship", join.relationship.as_deref());
    w.expr("sql_on", join.sql_on.as_deref());
    w.close();
}

/// Include paths for the views an explore references and the namespace
/// actually defines, base view first.
pub fn explore_includes(explore: &Explore, namespace: &Namespace) -> Vec<String> {
    let mut referenced: Vec<&str> = vec![explore.base_view()];
    for join in &explore.joins {
        let view = join.from.as_deref().unwrap_or(&join.name);
        if !referenced.contains(&view) {
            referenced.push(view);
        }
    }

    referenced
        .into_iter()
        .filter(|name| namespace.view(name).is_some())
        .map(|name| format!("/views/{}.view.lkml", name))
        .collect()
}
