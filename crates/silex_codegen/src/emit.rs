//! # Scanner Source Emission
//!
//! Writes the generated scanner as plain Rust source text: the
//! verbatim header, the combined tables, one dispatch function per
//! rule, and the verbatim footer.
//!
//! Code is built into a single `String` with `std::fmt::Write`;
//! action fragments and rule parameters are spliced in untouched.

use std::fmt::Write;

use silex::CompiledSpecification;

use crate::tables::{build_tables, CodegenError, CombinedTables};

/// Generate the complete scanner source for a compiled
/// specification.
///
/// # Errors
///
/// Fails when the combined tables cannot be laid out; no partial
/// source is produced.
pub fn emit_scanner(spec: &CompiledSpecification) -> Result<String, CodegenError> {
    let tables = build_tables(spec)?;

    let width = tables.max_char as usize + 1;
    let estimated = 1024 + tables.state_count() * width * 4;
    let mut buf = String::with_capacity(estimated);

    if let Some(header) = &spec.header {
        buf.push_str(&header.text);
        buf.push_str("\n\n");
    }

    write_preamble(&mut buf, &tables);
    write_tables(&mut buf, &tables);

    for (name, rule) in spec.rules() {
        let layout = tables
            .layout(name)
            .expect("every compiled rule has a layout");
        writeln!(buf, "/// Initial combined state of rule `{name}`.").ok();
        writeln!(
            buf,
            "pub const {}_START: u16 = {};",
            upper_snake(name),
            layout.initial_state
        )
        .ok();
        buf.push('\n');
        write_dispatch(&mut buf, name, &rule.parameters, &rule.clause_actions);
    }

    writeln!(
        buf,
        "pub const START_RULE: u16 = {}_START;",
        upper_snake(&spec.start_rule)
    )
    .ok();

    if let Some(footer) = &spec.footer {
        buf.push('\n');
        buf.push_str(&footer.text);
        buf.push('\n');
    }

    Ok(buf)
}

fn write_preamble(buf: &mut String, tables: &CombinedTables) {
    writeln!(
        buf,
        "/// No transition / no accepting clause in the tables below."
    )
    .ok();
    writeln!(buf, "pub const SENTINEL: u16 = {};", crate::tables::SENTINEL).ok();
    writeln!(buf, "pub const MAX_CHAR: u32 = {};", tables.max_char).ok();
    buf.push('\n');
}

fn write_tables(buf: &mut String, tables: &CombinedTables) {
    writeln!(
        buf,
        "/// `TRANS[state][char]`: combined target state or `SENTINEL`."
    )
    .ok();
    writeln!(buf, "pub static TRANS: &[&[u16]] = &[").ok();
    for row in &tables.trans {
        buf.push_str("    &[");
        for (idx, cell) in row.iter().enumerate() {
            if idx > 0 {
                buf.push_str(", ");
            }
            write!(buf, "{cell}").ok();
        }
        buf.push_str("],\n");
    }
    buf.push_str("];\n\n");

    writeln!(
        buf,
        "/// `ACTIONS[state]`: accepted clause index or `SENTINEL`."
    )
    .ok();
    buf.push_str("pub static ACTIONS: &[u16] = &[");
    for (idx, cell) in tables.actions.iter().enumerate() {
        if idx > 0 {
            buf.push_str(", ");
        }
        write!(buf, "{cell}").ok();
    }
    buf.push_str("];\n\n");
}

fn write_dispatch(
    buf: &mut String,
    name: &str,
    parameters: &[compact_str::CompactString],
    actions: &[silex::CodeFragment],
) {
    write!(buf, "pub fn {name}(clause: u16").ok();
    for parameter in parameters {
        write!(buf, ", {parameter}").ok();
    }
    buf.push_str(") {\n");
    buf.push_str("    match clause {\n");
    for (index, action) in actions.iter().enumerate() {
        writeln!(buf, "        {index} => {{ {} }}", action.text).ok();
    }
    buf.push_str("        _ => unreachable!(\"no accepting clause\"),\n");
    buf.push_str("    }\n");
    buf.push_str("}\n\n");
}

fn upper_snake(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' => c.to_ascii_uppercase(),
            'A'..='Z' | '0'..='9' => c,
            _ => '_',
        })
        .collect()
}
