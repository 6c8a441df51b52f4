use crate::registry::{TagRule, TagRuleRegistry};

pub fn render_tags(registry: &TagRuleRegistry) -> String {
    let mut out = String::new();

    for (tag, rule) in registry.tags() {
        let target = match rule {
            TagRule::Verbatim(field) => format!("-> {field}"),
            TagRule::Structured(_) if registry.is_closing(tag) => "closes session".to_string(),
            TagRule::Structured(_) => String::new(),
        };
        out.push_str(format!("{:<14} {:<10} {}", tag, rule.kind(), target).trim_end());
        out.push('\n');
    }

    out
}

pub fn run() -> anyhow::Result<()> {
    print!("{}", render_tags(TagRuleRegistry::builtin()));
    Ok(())
}
