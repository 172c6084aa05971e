pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Longest prefix of `value` not exceeding `max` bytes that ends on a char boundary.
pub fn truncated(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

/// Byte offset of `needle` in `haystack`, ASCII case-insensitive.
pub fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let haystack = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len())
        .find(|&i| haystack[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

/// Replaces `marker` with `prefix` everywhere outside of quoted string literals.
pub fn replace_prefix(sql: &str, prefix: &str, marker: &str) -> String {
    if marker.is_empty() {
        return sql.to_owned();
    }
    let mut out = String::with_capacity(sql.len() + 16);
    let mut rest = sql;
    while let Some(start) = rest.find(['\'', '"']) {
        out.push_str(&rest[..start].replace(marker, prefix));
        let quote = rest.as_bytes()[start] as char;
        let mut escaped = false;
        let end = rest[start + 1..].char_indices().find_map(|(i, c)| {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                return Some(start + 1 + i + 1);
            }
            None
        });
        let Some(end) = end else {
            out.push_str(&rest[start..]);
            return out;
        };
        out.push_str(&rest[start..end]);
        rest = &rest[end..];
    }
    out.push_str(&rest.replace(marker, prefix));
    out
}

/// Adds `offset` to the number following every occurrence of `prefix`.
pub fn shift_placeholders(text: &str, prefix: &str, offset: u32) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut rest = text;
    while let Some(start) = rest.find(prefix) {
        let end = start + prefix.len();
        out.push_str(&rest[..end]);
        let digits = rest[end..].bytes().take_while(u8::is_ascii_digit).count();
        let number = &rest[end..end + digits];
        match number.parse::<u32>() {
            Ok(n) => out.push_str(itoa::Buffer::new().format(n + offset)),
            Err(..) => out.push_str(number),
        }
        rest = &rest[end + digits..];
    }
    out.push_str(rest);
    out
}

#[macro_export]
macro_rules! possibly_parenthesized {
    ($buff:ident, $cond:expr, $v:expr) => {
        if $cond {
            $buff.push('(');
            $v;
            $buff.push(')');
        } else {
            $v;
        }
    };
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {
        format_args!(
            "{}{}",
            $crate::truncated(&$query, 497).trim_end(),
            if $query.len() > 497 { "..." } else { "" },
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separated() {
        let mut out = String::from("SELECT ");
        separated_by(&mut out, ["a", "b", "c"], |out, v| out.push_str(v), ", ");
        assert_eq!(out, "SELECT a, b, c");
        let mut out = String::new();
        separated_by(&mut out, Vec::<&str>::new(), |out, v| out.push_str(v), ",");
        assert!(out.is_empty());
    }

    #[test]
    fn truncate_on_char_boundary() {
        assert_eq!(truncated("hello", 10), "hello");
        assert_eq!(truncated("hello", 3), "hel");
        assert_eq!(truncated("héllo", 2), "h");
    }

    #[test]
    fn prefix_outside_literals() {
        assert_eq!(
            replace_prefix("SELECT * FROM #__users WHERE name = '#__x'", "jos_", "#__"),
            "SELECT * FROM jos_users WHERE name = '#__x'"
        );
        assert_eq!(
            replace_prefix(r#"UPDATE `#__a` SET t = "it\"s #__" WHERE #__a.id = 'o''#__'"#, "p_", "#__"),
            r#"UPDATE `p_a` SET t = "it\"s #__" WHERE p_a.id = 'o''#__'"#
        );
        assert_eq!(replace_prefix("SELECT '#__", "p_", "#__"), "SELECT '#__");
        assert_eq!(replace_prefix("#__a", "p_", ""), "#__a");
    }

    #[test]
    fn shift_numbered_placeholders() {
        assert_eq!(
            shift_placeholders("id IN (:p1,:p2) AND x = :p10 AND y = :px", ":p", 3),
            "id IN (:p4,:p5) AND x = :p13 AND y = :px"
        );
        assert_eq!(shift_placeholders("a = 1", ":p", 3), "a = 1");
    }

    #[test]
    fn find_case_insensitive() {
        assert_eq!(find_ignore_ascii_case("a.b As c", " as "), Some(3));
        assert_eq!(find_ignore_ascii_case("abc", " as "), None);
        assert_eq!(find_ignore_ascii_case("", "x"), None);
    }
}
