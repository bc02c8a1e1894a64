//! CSS colour-literal validation.
//!
//! Classification only needs to answer one question about a compiled
//! value: *is this a colour?* The evaluation itself already happened in
//! the external compiler, so the check is purely syntactic: hex forms,
//! the CSS named-colour keywords, and the `rgb()`/`hsl()` functional
//! notations.

/// The CSS extended colour keywords, plus `transparent`. Sorted for
/// binary search.
const NAMED_COLOURS: &[&str] = &[
    "aliceblue",
    "antiquewhite",
    "aqua",
    "aquamarine",
    "azure",
    "beige",
    "bisque",
    "black",
    "blanchedalmond",
    "blue",
    "blueviolet",
    "brown",
    "burlywood",
    "cadetblue",
    "chartreuse",
    "chocolate",
    "coral",
    "cornflowerblue",
    "cornsilk",
    "crimson",
    "cyan",
    "darkblue",
    "darkcyan",
    "darkgoldenrod",
    "darkgray",
    "darkgreen",
    "darkgrey",
    "darkkhaki",
    "darkmagenta",
    "darkolivegreen",
    "darkorange",
    "darkorchid",
    "darkred",
    "darksalmon",
    "darkseagreen",
    "darkslateblue",
    "darkslategray",
    "darkslategrey",
    "darkturquoise",
    "darkviolet",
    "deeppink",
    "deepskyblue",
    "dimgray",
    "dimgrey",
    "dodgerblue",
    "firebrick",
    "floralwhite",
    "forestgreen",
    "fuchsia",
    "gainsboro",
    "ghostwhite",
    "gold",
    "goldenrod",
    "gray",
    "green",
    "greenyellow",
    "grey",
    "honeydew",
    "hotpink",
    "indianred",
    "indigo",
    "ivory",
    "khaki",
    "lavender",
    "lavenderblush",
    "lawngreen",
    "lemonchiffon",
    "lightblue",
    "lightcoral",
    "lightcyan",
    "lightgoldenrodyellow",
    "lightgray",
    "lightgreen",
    "lightgrey",
    "lightpink",
    "lightsalmon",
    "lightseagreen",
    "lightskyblue",
    "lightslategray",
    "lightslategrey",
    "lightsteelblue",
    "lightyellow",
    "lime",
    "limegreen",
    "linen",
    "magenta",
    "maroon",
    "mediumaquamarine",
    "mediumblue",
    "mediumorchid",
    "mediumpurple",
    "mediumseagreen",
    "mediumslateblue",
    "mediumspringgreen",
    "mediumturquoise",
    "mediumvioletred",
    "midnightblue",
    "mintcream",
    "mistyrose",
    "moccasin",
    "navajowhite",
    "navy",
    "oldlace",
    "olive",
    "olivedrab",
    "orange",
    "orangered",
    "orchid",
    "palegoldenrod",
    "palegreen",
    "paleturquoise",
    "palevioletred",
    "papayawhip",
    "peachpuff",
    "peru",
    "pink",
    "plum",
    "powderblue",
    "purple",
    "rebeccapurple",
    "red",
    "rosybrown",
    "royalblue",
    "saddlebrown",
    "salmon",
    "sandybrown",
    "seagreen",
    "seashell",
    "sienna",
    "silver",
    "skyblue",
    "slateblue",
    "slategray",
    "slategrey",
    "snow",
    "springgreen",
    "steelblue",
    "tan",
    "teal",
    "thistle",
    "tomato",
    "transparent",
    "turquoise",
    "violet",
    "wheat",
    "white",
    "whitesmoke",
    "yellow",
    "yellowgreen",
];

/// Returns true when `value` is a syntactically valid CSS colour literal.
///
/// Accepted forms, case-insensitively:
///
/// - hex: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`
/// - named keywords: `red`, `whitesmoke`, `transparent`, ...
/// - functional: `rgb(...)`, `rgba(...)`, `hsl(...)`, `hsla(...)` with
///   numeric/percentage arguments
///
/// # Example
///
/// ```rust
/// use swatch_vars::is_colour;
///
/// assert!(is_colour("#222222"));
/// assert!(is_colour("whitesmoke"));
/// assert!(is_colour("rgba(0, 0, 0, 0.5)"));
/// assert!(!is_colour("arial"));
/// ```
pub fn is_colour(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }

    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }

    let lower = value.to_ascii_lowercase();
    if NAMED_COLOURS.binary_search(&lower.as_str()).is_ok() {
        return true;
    }

    is_functional_colour(&lower)
}

/// Checks the `rgb()`/`rgba()`/`hsl()`/`hsla()` notations.
fn is_functional_colour(lower: &str) -> bool {
    let Some((function, rest)) = lower.split_once('(') else {
        return false;
    };
    if !matches!(function.trim(), "rgb" | "rgba" | "hsl" | "hsla") {
        return false;
    }
    let Some(args) = rest.strip_suffix(')') else {
        return false;
    };

    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if !matches!(parts.len(), 3 | 4) {
        return false;
    }
    parts.iter().all(|part| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '.' | '%' | '-'))
    })
}
