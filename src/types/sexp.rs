use std::fmt;

/// A symbolic expression as read from keyword source text.
///
/// Lists keep an optional dotted tail. The reader splices list tails, so a
/// tail is never itself a list and never `nil`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sexp {
    Int(i64),
    Str(String),
    Symbol(String),
    List(Vec<Sexp>, Option<Box<Sexp>>),
}

impl Sexp {
    #[must_use]
    pub fn nil() -> Sexp {
        Sexp::Symbol("nil".to_owned())
    }

    #[must_use]
    pub fn symbol(name: &str) -> Sexp {
        Sexp::Symbol(name.to_owned())
    }

    #[must_use]
    pub fn string(s: &str) -> Sexp {
        Sexp::Str(s.to_owned())
    }

    #[must_use]
    pub fn list(items: Vec<Sexp>) -> Sexp {
        Sexp::List(items, None)
    }

    /// Build `(items... . tail)`, splicing list tails and dropping `nil`.
    #[must_use]
    pub fn dotted(mut items: Vec<Sexp>, tail: Sexp) -> Sexp {
        match tail {
            Sexp::List(rest, rest_tail) => {
                items.extend(rest);
                Sexp::List(items, rest_tail)
            }
            t if t.is_nil() => Sexp::List(items, None),
            t => Sexp::List(items, Some(Box::new(t))),
        }
    }

    #[must_use]
    pub fn quote(inner: Sexp) -> Sexp {
        Sexp::list(vec![Sexp::symbol("quote"), inner])
    }

    #[must_use]
    pub fn function(inner: Sexp) -> Sexp {
        Sexp::list(vec![Sexp::symbol("function"), inner])
    }

    /// `nil` and the empty list are the same object in the host language.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        match self {
            Sexp::Symbol(s) => s == "nil",
            Sexp::List(items, None) => items.is_empty(),
            _ => false,
        }
    }

    #[must_use]
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Sexp::Symbol(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Sexp::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Items of a non-empty list, ignoring any dotted tail.
    #[must_use]
    pub fn as_items(&self) -> Option<&[Sexp]> {
        match self {
            Sexp::List(items, _) if !items.is_empty() => Some(items),
            _ => None,
        }
    }

    /// The symbol in head position of a list, if any.
    #[must_use]
    pub fn head(&self) -> Option<&str> {
        self.as_items().and_then(|items| items[0].as_symbol())
    }

    /// The `x` of `(quote x)` or `(function x)` when the list has that shape.
    #[must_use]
    pub fn unwrap_form(&self, head: &str) -> Option<&Sexp> {
        match self {
            Sexp::List(items, None) if items.len() == 2 && items[0].as_symbol() == Some(head) => {
                Some(&items[1])
            }
            _ => None,
        }
    }
}

fn write_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(inner) = self.unwrap_form("quote") {
            return write!(f, "'{inner}");
        }
        if let Some(inner) = self.unwrap_form("function") {
            return write!(f, "#'{inner}");
        }
        match self {
            Sexp::Int(n) => write!(f, "{n}"),
            Sexp::Str(s) => write_string(f, s),
            Sexp::Symbol(s) => f.write_str(s),
            Sexp::List(items, None) if items.is_empty() => f.write_str("nil"),
            Sexp::List(items, tail) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                if let Some(tail) = tail {
                    write!(f, " . {tail}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<i64> for Sexp {
    fn from(n: i64) -> Self {
        Sexp::Int(n)
    }
}

impl From<&str> for Sexp {
    fn from(s: &str) -> Self {
        Sexp::Str(s.to_owned())
    }
}
