// crates/tabflow-core/src/markup.rs
//
// Minimal tag-level scanning for the markup sources (remote HTML tables
// and local XML row files). Deliberately naive: no nesting of a tag
// inside itself, ASCII case-insensitive tag names. That is all the
// documents we read require.

/// One `<tag ...>inner</tag>` occurrence: the raw attribute text of the
/// opening tag plus everything between the opening and closing tags.
#[derive(Debug, Clone, Copy)]
pub struct TagBlock<'a> {
    pub attrs: &'a str,
    pub inner: &'a str,
}

/// All `<tag ...>...</tag>` blocks in `source`, in document order.
/// Self-closing and unterminated occurrences are skipped.
pub fn tag_blocks<'a>(source: &'a str, tag: &str) -> Vec<TagBlock<'a>> {
    let lower = ascii_lowercase(source);
    let open = format!("<{}", tag.to_ascii_lowercase());
    let close = format!("</{}>", tag.to_ascii_lowercase());

    let mut blocks = Vec::new();
    let mut pos = 0usize;
    while let Some(found) = lower[pos..].find(&open) {
        let start = pos + found;
        let after_name = start + open.len();
        // Require a real tag boundary so "<tr" does not match "<track".
        match lower.as_bytes().get(after_name) {
            Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') | Some(b'/') => {}
            _ => {
                pos = after_name;
                continue;
            }
        }
        let Some(gt_rel) = source[after_name..].find('>') else {
            break;
        };
        let open_end = after_name + gt_rel + 1;
        let attrs = source[after_name..open_end - 1].trim();
        if attrs.ends_with('/') {
            // Self-closing: no inner content.
            pos = open_end;
            continue;
        }
        let Some(close_rel) = lower[open_end..].find(&close) else {
            break;
        };
        let inner = &source[open_end..open_end + close_rel];
        blocks.push(TagBlock { attrs, inner });
        pos = open_end + close_rel + close.len();
    }
    blocks
}

/// First block of `tag` in `source`, if any.
pub fn first_tag_block<'a>(source: &'a str, tag: &str) -> Option<TagBlock<'a>> {
    tag_blocks(source, tag).into_iter().next()
}

/// Inner content of the first child element named `tag`, for the XML
/// row files where each field is one child element.
pub fn child_text<'a>(source: &'a str, tag: &str) -> Option<&'a str> {
    first_tag_block(source, tag).map(|block| block.inner)
}

/// Value of attribute `name` in an attribute segment, quoted or
/// unquoted form. The attribute name must start at a boundary, so
/// `class=` does not match inside `data-class=`.
pub fn attr_value<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    let lower = ascii_lowercase(attrs);
    let key = format!("{}=", name.to_ascii_lowercase());
    let mut search = 0usize;
    loop {
        let idx = search + lower[search..].find(&key)?;
        let at_boundary = idx == 0 || lower.as_bytes()[idx - 1].is_ascii_whitespace();
        if !at_boundary {
            search = idx + key.len();
            continue;
        }
        let rest = &attrs[idx + key.len()..];
        let value = match rest.as_bytes().first() {
            Some(b'"') => rest[1..].split('"').next().unwrap_or(""),
            Some(b'\'') => rest[1..].split('\'').next().unwrap_or(""),
            _ => rest.split_whitespace().next().unwrap_or(""),
        };
        return Some(value);
    }
}

/// Whether an attribute segment carries `name="...needle..."`. Good
/// enough for class-attribute selection.
pub fn attr_contains(attrs: &str, name: &str, needle: &str) -> bool {
    attr_value(attrs, name).is_some_and(|value| value.contains(needle))
}

/// One cell of a table row. `header` distinguishes `<th>` from `<td>`;
/// the raw attrs are kept so callers can read rowspan/colspan.
#[derive(Debug, Clone, Copy)]
pub struct RowCell<'a> {
    pub header: bool,
    pub attrs: &'a str,
    pub inner: &'a str,
}

/// Cells of one table row, `<th>` and `<td>` in document order.
pub fn row_cell_blocks(row_inner: &str) -> Vec<RowCell<'_>> {
    let lower = ascii_lowercase(row_inner);
    let mut cells = Vec::new();
    let mut pos = 0usize;
    loop {
        let next_th = lower[pos..].find("<th");
        let next_td = lower[pos..].find("<td");
        let (rel, tag) = match (next_th, next_td) {
            (Some(a), Some(b)) if a < b => (a, "th"),
            (_, Some(b)) => (b, "td"),
            (Some(a), None) => (a, "th"),
            (None, None) => break,
        };
        let start = pos + rel;
        let rest = &row_inner[start..];
        let blocks = tag_blocks(rest, tag);
        match blocks.first() {
            Some(block) => {
                cells.push(RowCell {
                    header: tag == "th",
                    attrs: block.attrs,
                    inner: block.inner,
                });
                // Resume scanning after the closing tag of this cell.
                let close = format!("</{tag}>");
                match ascii_lowercase(rest).find(&close) {
                    Some(idx) => pos = start + idx + close.len(),
                    None => break,
                }
            }
            None => break,
        }
    }
    cells
}

/// Cell texts of one table row, `<th>` and `<td>` in document order.
pub fn row_cells(row_inner: &str) -> Vec<String> {
    row_cell_blocks(row_inner)
        .into_iter()
        .map(|cell| cell_text(cell.inner))
        .collect()
}

/// Visible text of a cell: tags removed, common entities decoded,
/// whitespace collapsed.
pub fn cell_text(fragment: &str) -> String {
    let mut stripped = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for ch in fragment.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => stripped.push(ch),
            _ => {}
        }
    }
    collapse_ws(&decode_entities(&stripped))
}

/// Named entities the source pages actually use, plus decimal and hex
/// character references (`&#8212;`, `&#x2014;`). Anything unrecognized
/// is left as-is.
fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';').filter(|&semi| semi > 1 && semi <= 12) {
            Some(semi) => match decode_entity(&tail[1..semi]) {
                Some(ch) => {
                    out.push(ch);
                    rest = &tail[semi + 1..];
                }
                None => {
                    out.push('&');
                    rest = &tail[1..];
                }
            },
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "nbsp" => Some(' '),
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let reference = entity.strip_prefix('#')?;
            let code = match reference.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => reference.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn collapse_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

fn ascii_lowercase(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}
