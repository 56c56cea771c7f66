//! Character reference decoding.

/// Decode a single reference name (without `&` and `;`).
///
/// Unknown names are preserved as written.
pub fn decode_entity(entity: &str) -> String {
    if let Some(numeric) = entity.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => numeric.parse::<u32>().ok(),
        };
        return code
            .and_then(char::from_u32)
            .map_or_else(|| format!("&{entity};"), |c| c.to_string());
    }

    let decoded = match entity {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "apos" => "'",
        "quot" => "\"",
        "nbsp" => "\u{00a0}",
        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "hellip" => "\u{2026}",
        "laquo" => "\u{00ab}",
        "raquo" => "\u{00bb}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "middot" => "\u{00b7}",
        "times" => "\u{00d7}",
        "Tab" => "\t",
        "NewLine" => "\n",
        "colon" => ":",
        _ => return format!("&{entity};"),
    };
    decoded.to_string()
}

/// Decode every `&name;` reference in a string.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        match after.find(';') {
            Some(semi) if is_reference_name(&after[..semi]) => {
                out.push_str(&decode_entity(&after[..semi]));
                rest = &after[semi + 1..];
            }
            _ => {
                out.push('&');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn is_reference_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 32
        && name
            .chars()
            .enumerate()
            .all(|(i, c)| c.is_ascii_alphanumeric() || (i == 0 && c == '#'))
}
