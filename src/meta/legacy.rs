//! Legacy `meta.txt` line grammar
//!
//! The txt dialect knows two shapes: `Key: Value` lines, and multiline
//! values opened by a line containing `|` and continued by tab-indented
//! lines. A `Genre` field doubles as `Tags` when no `Tags` field exists,
//! which is how pre-Core curations spelled their tags.

use crate::types::PropertyMap;

enum State {
    Simple,
    Multiline { key: String, chunks: Vec<String> },
}

/// Parse legacy meta text into a flat property map.
pub(crate) fn parse(text: &str) -> PropertyMap {
    let mut props = PropertyMap::new();
    let mut state = State::Simple;
    for line in text.lines() {
        state = step(state, line, &mut props);
    }
    if let State::Multiline { key, chunks } = state {
        props.insert(key, chunks.join("\n"));
    }

    if !props.contains_key("Tags") {
        if let Some(genre) = props.get("Genre").cloned() {
            props.insert("Tags".to_string(), genre);
        }
    }
    props
}

fn step(state: State, line: &str, props: &mut PropertyMap) -> State {
    match state {
        State::Simple => simple_line(line, props),
        State::Multiline { key, mut chunks } => {
            if let Some(rest) = line.strip_prefix('\t') {
                chunks.push(rest.trim_matches([' ', '\t']).to_string());
                State::Multiline { key, chunks }
            } else {
                // any non-indented line closes the value and is read again
                props.insert(key, chunks.join("\n"));
                simple_line(line, props)
            }
        }
    }
}

fn simple_line(line: &str, props: &mut PropertyMap) -> State {
    if line.contains('|') {
        let key = match line.split_once(':') {
            Some((key, _)) => key.trim().to_string(),
            None => line.trim().to_string(),
        };
        return State::Multiline {
            key,
            chunks: Vec::new(),
        };
    }
    if line.trim().is_empty() {
        return State::Simple;
    }
    if let Some((key, value)) = line.split_once(':') {
        props.insert(key.trim().to_string(), value.trim().to_string());
    }
    State::Simple
}
