// Instruction templates for the three text-polishing tasks.

pub fn improve_summary(summary: &str) -> String {
    format!(
        "Improve this resume summary professionally. \
         Keep it concise, ATS-friendly, and impact-driven:\n\n{summary}"
    )
}

pub fn suggest_skills(skills: &[String], count: usize) -> String {
    format!(
        "Given these skills ({}), suggest exactly {count} additional \
         modern technical skills relevant for a resume. \
         Return only a comma-separated list.",
        skills.join(", ")
    )
}

pub fn improve_project(description: &str) -> String {
    format!(
        "Rewrite the following project description into 1-2 bullet points. \
         Make it concise, action-oriented, and resume-ready:\n\n{description}"
    )
}
