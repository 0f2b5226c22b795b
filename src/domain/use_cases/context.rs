use std::{collections::BTreeMap, fmt::Write, sync::Arc};

use crate::{
    constants::{CONTENT_KEY_ABOUT, CONTENT_KEY_CONTACT},
    entities::{
        content::{AboutData, ContactData},
        experience::Experience,
        project::Project,
        skill::Skill,
    },
    errors::AppError,
    repositories::{
        content::ContentRepository, experience::ExperienceRepository, project::ProjectRepository,
        skill::SkillRepository,
    },
};

/// Turns the portfolio tables into a plain-text block for the chat prompt
pub struct ContextBuilder {
    skill_repo: Arc<dyn SkillRepository>,
    experience_repo: Arc<dyn ExperienceRepository>,
    project_repo: Arc<dyn ProjectRepository>,
    content_repo: Arc<dyn ContentRepository>,
}

impl ContextBuilder {
    pub fn new(
        skill_repo: Arc<dyn SkillRepository>,
        experience_repo: Arc<dyn ExperienceRepository>,
        project_repo: Arc<dyn ProjectRepository>,
        content_repo: Arc<dyn ContentRepository>,
    ) -> Self {
        ContextBuilder {
            skill_repo,
            experience_repo,
            project_repo,
            content_repo,
        }
    }

    /// Always loads every section regardless of the question; the first failing
    /// query aborts the build. Missing about/contact rows just omit their section.
    pub async fn build(&self, message: &str) -> Result<String, AppError> {
        tracing::debug!(message_len = message.len(), "building chat context");

        let skills = self.skill_repo.list().await?;
        let experiences = self.experience_repo.list_active().await?;
        let projects = self.project_repo.list_active().await?;
        let about = self.page::<AboutData>(CONTENT_KEY_ABOUT).await?;
        let contact = self.page::<ContactData>(CONTENT_KEY_CONTACT).await?;

        let mut out = String::new();
        render_skills(&mut out, &skills);
        render_experience(&mut out, &experiences);
        render_projects(&mut out, &projects);
        if let Some(about) = about {
            render_about(&mut out, &about);
        }
        if let Some(contact) = contact {
            render_contact(&mut out, &contact);
        }

        Ok(out.trim_end().to_string())
    }

    async fn page<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        let Some(entry) = self.content_repo.find_by_key(key).await? else {
            return Ok(None);
        };

        match serde_json::from_value(entry.value) {
            Ok(page) => Ok(Some(page)),
            Err(e) => {
                tracing::warn!(key, error = %e, "skipping malformed page document in chat context");
                Ok(None)
            }
        }
    }
}

fn render_skills(out: &mut String, skills: &[Skill]) {
    if skills.is_empty() {
        return;
    }

    let mut by_category: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for skill in skills {
        by_category
            .entry(skill.category.as_str())
            .or_default()
            .push(format!("{} ({}/5)", skill.name, skill.proficiency));
    }

    let _ = writeln!(out, "SKILLS:");
    for (category, names) in by_category {
        let _ = writeln!(out, "- {}: {}", category, names.join(", "));
    }
    out.push('\n');
}

fn render_experience(out: &mut String, experiences: &[Experience]) {
    if experiences.is_empty() {
        return;
    }

    let _ = writeln!(out, "EXPERIENCE:");
    for exp in experiences {
        let end = match (exp.current, exp.end_date) {
            (true, _) | (false, None) => "present".to_string(),
            (false, Some(date)) => date.format("%b %Y").to_string(),
        };
        let _ = write!(
            out,
            "- {} at {} ({} - {}): {}",
            exp.title,
            exp.company,
            exp.start_date.format("%b %Y"),
            end,
            exp.description
        );
        if !exp.technologies.is_empty() {
            let _ = write!(out, " Technologies: {}.", exp.technologies.join(", "));
        }
        out.push('\n');
    }
    out.push('\n');
}

fn render_projects(out: &mut String, projects: &[Project]) {
    if projects.is_empty() {
        return;
    }

    let _ = writeln!(out, "PROJECTS:");
    for project in projects {
        let _ = write!(out, "- {} [{}]: {}", project.title, project.project_type, project.description);
        if !project.technologies.is_empty() {
            let _ = write!(out, " Technologies: {}.", project.technologies.join(", "));
        }
        if let Some(url) = &project.live_url {
            let _ = write!(out, " Live: {}", url);
        }
        if let Some(url) = &project.github_url {
            let _ = write!(out, " Source: {}", url);
        }
        out.push('\n');
    }
    out.push('\n');
}

fn render_about(out: &mut String, about: &AboutData) {
    let _ = writeln!(out, "ABOUT:");
    let _ = writeln!(out, "{}", about.description);
    for highlight in &about.highlights {
        let _ = writeln!(out, "- {}", highlight.text);
    }
    out.push('\n');
}

fn render_contact(out: &mut String, contact: &ContactData) {
    let _ = writeln!(out, "CONTACT:");
    let _ = writeln!(out, "Email: {}", contact.email);
    if !contact.location.is_empty() {
        let _ = writeln!(out, "Location: {}", contact.location);
    }
    if let Some(linkedin) = &contact.linkedin {
        let _ = writeln!(out, "LinkedIn: {}", linkedin);
    }
    if let Some(github) = &contact.github {
        let _ = writeln!(out, "GitHub: {}", github);
    }
    if !contact.availability.is_empty() {
        let _ = writeln!(out, "Availability: {}", contact.availability);
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::content::ContentEntry,
        repositories::{
            content::MockContentRepository, experience::MockExperienceRepository,
            project::MockProjectRepository, skill::MockSkillRepository,
        },
    };
    use chrono::{NaiveDate, Utc};
    use serde_json::json;

    fn skill(name: &str, category: &str, proficiency: i32) -> Skill {
        Skill {
            id: 1,
            name: name.into(),
            category: category.into(),
            proficiency,
            icon: None,
            display_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn project(title: &str) -> Project {
        Project {
            id: 1,
            title: title.into(),
            description: "A tool".into(),
            project_type: "cli".into(),
            technologies: vec!["Rust".into()],
            github_url: Some("https://github.com/me/tool".into()),
            live_url: None,
            video_url: None,
            featured: true,
            active: true,
            display_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn experience() -> Experience {
        Experience {
            id: 1,
            title: "Backend Engineer".into(),
            company: "Acme".into(),
            start_date: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
            end_date: None,
            current: true,
            description: "Built APIs.".into(),
            technologies: vec!["Go".into(), "Postgres".into()],
            display_order: 0,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn content(key: &str, value: serde_json::Value) -> ContentEntry {
        ContentEntry {
            id: 1,
            key: key.into(),
            content_type: "page".into(),
            value,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn builder(
        skills: MockSkillRepository,
        experiences: MockExperienceRepository,
        projects: MockProjectRepository,
        contents: MockContentRepository,
    ) -> ContextBuilder {
        ContextBuilder::new(Arc::new(skills), Arc::new(experiences), Arc::new(projects), Arc::new(contents))
    }

    #[tokio::test]
    async fn renders_every_section() {
        let mut skills = MockSkillRepository::new();
        skills
            .expect_list()
            .returning(|| Ok(vec![skill("Rust", "Languages", 5), skill("Go", "Languages", 4)]));

        let mut experiences = MockExperienceRepository::new();
        experiences.expect_list_active().returning(|| Ok(vec![experience()]));

        let mut projects = MockProjectRepository::new();
        projects.expect_list_active().returning(|| Ok(vec![project("portfolio-cli")]));

        let mut contents = MockContentRepository::new();
        contents.expect_find_by_key().returning(|key| {
            Ok(Some(match key {
                "about" => content(key, json!({"description": "I build backends.", "highlights": []})),
                _ => content(key, json!({"email": "me@example.com", "location": "Lagos", "availability": "Open"})),
            }))
        });

        let context = builder(skills, experiences, projects, contents)
            .build("what do you know?")
            .await
            .unwrap();

        assert!(context.contains("SKILLS:\n- Languages: Rust (5/5), Go (4/5)"));
        assert!(context.contains("- Backend Engineer at Acme (Mar 2021 - present): Built APIs. Technologies: Go, Postgres."));
        assert!(context.contains("- portfolio-cli [cli]: A tool Technologies: Rust. Source: https://github.com/me/tool"));
        assert!(context.contains("ABOUT:\nI build backends."));
        assert!(context.contains("CONTACT:\nEmail: me@example.com\nLocation: Lagos"));
    }

    #[tokio::test]
    async fn missing_pages_are_skipped() {
        let mut skills = MockSkillRepository::new();
        skills.expect_list().returning(|| Ok(vec![]));
        let mut experiences = MockExperienceRepository::new();
        experiences.expect_list_active().returning(|| Ok(vec![]));
        let mut projects = MockProjectRepository::new();
        projects.expect_list_active().returning(|| Ok(vec![project("only")]));
        let mut contents = MockContentRepository::new();
        contents.expect_find_by_key().returning(|_| Ok(None));

        let context = builder(skills, experiences, projects, contents).build("hi").await.unwrap();

        assert!(context.starts_with("PROJECTS:"));
        assert!(!context.contains("ABOUT:"));
        assert!(!context.contains("CONTACT:"));
    }

    #[tokio::test]
    async fn first_failing_query_aborts() {
        let mut skills = MockSkillRepository::new();
        skills
            .expect_list()
            .returning(|| Err(AppError::InternalError("connection reset".into())));

        let mut experiences = MockExperienceRepository::new();
        experiences.expect_list_active().never();
        let projects = MockProjectRepository::new();
        let contents = MockContentRepository::new();

        let result = builder(skills, experiences, projects, contents).build("hi").await;
        assert!(matches!(result, Err(AppError::InternalError(_))));
    }
}
