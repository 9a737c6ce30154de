/// Joins a list of tags into the form a site expects in its search parameter.
#[macro_export]
macro_rules! join_tags {
    ($x:expr) => {{
        let tl = $x.join(" ");
        tl
    }};
    ($x:expr, $sep:expr) => {{
        let tl = $x.join($sep);
        tl
    }};
}

/// Splits a whitespace separated tag string into owned tags.
#[macro_export]
macro_rules! split_tags {
    ($x:expr) => {{
        $x.split_whitespace()
            .map(str::to_string)
            .collect::<Vec<String>>()
    }};
}
