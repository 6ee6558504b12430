//! Naming policy mapping raw C names onto generated PHP names.

/// Kind of declaration a name belongs to; selects the naming rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Enum,
    Struct,
    Union,
    Class,
    EnumValue,
    Other,
}

/// Capability object resolving raw C names and the generated entrypoint's
/// identity. Injected into the inference engine and every visitor.
pub trait NamingStrategy {
    /// Fully-qualified name of the generated FFI entrypoint.
    fn entrypoint(&self) -> &str;

    fn entrypoint_namespace(&self) -> String {
        let parts: Vec<&str> = self.entrypoint().split('\\').collect();
        parts[..parts.len().saturating_sub(1)].join("\\")
    }

    fn entrypoint_class_name(&self) -> &str {
        self.entrypoint()
            .rsplit('\\')
            .next()
            .unwrap_or_else(|| self.entrypoint())
    }

    /// Generated PHP name for a raw C name of the given kind.
    fn name_for(&self, name: &str, kind: NameKind) -> String;
}

/// Default policy: enums become CamelCase classes in the external namespace,
/// records become CamelCase classes in the IDE-internal namespace, enum
/// values become UPPER_SNAKE constants, everything else passes through.
#[derive(Debug, Clone)]
pub struct SimpleNamingStrategy {
    pub entrypoint: String,
    pub external_namespace: String,
    pub internal_namespace: String,
}

impl Default for SimpleNamingStrategy {
    fn default() -> Self {
        Self {
            entrypoint: "FFI\\Generated\\EntrypointInterface".to_string(),
            external_namespace: "FFI\\Generated".to_string(),
            internal_namespace: "PHPSTORM_META".to_string(),
        }
    }
}

impl SimpleNamingStrategy {
    pub fn new(entrypoint: impl Into<String>) -> Self {
        Self {
            entrypoint: entrypoint.into(),
            ..Self::default()
        }
    }

    fn external_prefix(&self) -> String {
        format!("{}\\", self.external_namespace.trim_matches('\\'))
    }

    fn internal_prefix(&self) -> String {
        format!("{}\\", self.internal_namespace.trim_matches('\\'))
    }
}

impl NamingStrategy for SimpleNamingStrategy {
    fn entrypoint(&self) -> &str {
        &self.entrypoint
    }

    fn name_for(&self, name: &str, kind: NameKind) -> String {
        match kind {
            NameKind::Enum => format!("{}{}", self.external_prefix(), to_camel_case(name)),
            NameKind::Struct | NameKind::Union | NameKind::Class => {
                format!("{}{}", self.internal_prefix(), to_camel_case(name))
            }
            NameKind::EnumValue => to_upper_snake_case(name),
            NameKind::Other => name.to_string(),
        }
    }
}

/// Inserts an underscore at every lower-to-upper case boundary.
fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut previous_lower = false;

    for ch in name.chars() {
        if ch.is_uppercase() && previous_lower {
            out.push('_');
        }
        previous_lower = ch.is_lowercase();
        out.push(ch);
    }

    out
}

fn to_upper_snake_case(name: &str) -> String {
    to_snake_case(name).to_uppercase()
}

/// Capitalizes the first letter of every underscore-separated segment and
/// drops the underscores; the rest of each segment keeps its case, so
/// acronyms survive (`SDL_Window` → `SDLWindow`).
fn to_camel_case(name: &str) -> String {
    let snake = to_snake_case(name);
    let mut out = String::with_capacity(snake.len());
    let mut upper_next = true;

    for ch in snake.chars() {
        if ch == '_' {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }

    out
}
