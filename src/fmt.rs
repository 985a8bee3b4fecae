use crate::problem::{SemgusProblem, SemgusProduction};

/// Renders the grammar, one non-terminal per block with its productions and their semantic
/// rules, followed by a blank line and the global constraints.
pub fn dump_problem(problem: &SemgusProblem) -> String {
    let mut out = String::new();

    for non_terminal in problem.non_terminals() {
        out.push_str(&format!("{} →\n", non_terminal.name));
        for production in non_terminal.productions.values() {
            out.push_str(&format!("  {}\n", render_production(problem, production)));
            for rule in &production.semantic_rules {
                out.push_str(&format!("    {rule}\n"));
            }
        }
    }
    out.push('\n');

    let constraints = problem
        .constraints()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    out.push_str(&constraints);

    out.trim_end().to_string() + "\n"
}

fn render_production(problem: &SemgusProblem, production: &SemgusProduction) -> String {
    let mut parts = vec![production.operator.clone()];
    parts.extend(problem.children(production).map(|child| child.name.clone()));
    parts.join(" ")
}

impl std::fmt::Display for SemgusProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&dump_problem(self))
    }
}
