//! Route name inflection: table name -> pluralized, lower-cased path segment.
//! e.g. "Widget" -> "widgets", "category" -> "categories", "blog_person" -> "blog_people"

const UNCOUNTABLE: &[&str] = &[
    "data",
    "deer",
    "equipment",
    "feedback",
    "fish",
    "information",
    "media",
    "metadata",
    "money",
    "news",
    "rice",
    "series",
    "sheep",
    "software",
    "species",
    "staff",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("analysis", "analyses"),
    ("calf", "calves"),
    ("child", "children"),
    ("crisis", "crises"),
    ("criterion", "criteria"),
    ("echo", "echoes"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("half", "halves"),
    ("hero", "heroes"),
    ("index", "indices"),
    ("knife", "knives"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("loaf", "loaves"),
    ("man", "men"),
    ("matrix", "matrices"),
    ("mouse", "mice"),
    ("ox", "oxen"),
    ("person", "people"),
    ("potato", "potatoes"),
    ("quiz", "quizzes"),
    ("shelf", "shelves"),
    ("thief", "thieves"),
    ("tomato", "tomatoes"),
    ("tooth", "teeth"),
    ("vertex", "vertices"),
    ("wife", "wives"),
    ("wolf", "wolves"),
    ("woman", "women"),
];

/// Lower-case and pluralize a table name for use as the base route.
pub fn route_name(table_name: &str) -> String {
    pluralize(&table_name.trim().to_lowercase())
}

/// Pluralize the last word of a lower-case identifier. Words joined by `_` or `-` keep their prefix.
pub fn pluralize(word: &str) -> String {
    match word.rfind(|c| c == '_' || c == '-') {
        Some(i) if i + 1 < word.len() => {
            let (prefix, last) = word.split_at(i + 1);
            format!("{}{}", prefix, pluralize_word(last))
        }
        _ => pluralize_word(word),
    }
}

fn pluralize_word(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
        return (*plural).to_string();
    }
    if IRREGULAR.iter().any(|(_, plural)| *plural == word) {
        return word.to_string();
    }

    if ["ss", "sh", "ch", "x", "z"].iter().any(|end| word.ends_with(end)) {
        return format!("{}es", word);
    }
    if word.ends_with("us") {
        return format!("{}es", word);
    }
    if let Some(stem) = word.strip_suffix("is") {
        return format!("{}es", stem);
    }
    if word.ends_with('s') {
        // already plural ("users")
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix('y') {
        let before = stem.chars().last();
        if !matches!(before, Some('a' | 'e' | 'i' | 'o' | 'u') | None) {
            return format!("{}ies", stem);
        }
    }
    format!("{}s", word)
}
