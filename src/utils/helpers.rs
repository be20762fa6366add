use crate::models::repository::Repository;

pub fn format_results(query: &str, repos: &[Repository], completed: bool) -> String {
    if repos.is_empty() {
        return format!("No repositories found for '{}'.", query);
    }

    let mut message = String::new();

    message.push_str(&format!("Repositories matching '{}'\n\n", query));

    for (i, repo) in repos.iter().enumerate() {
        message.push_str(&format!(
            "{}. {} - {} stars\n   {} - {}\n   {}\n",
            i + 1,
            repo.full_name,
            format_number(repo.stargazers_count),
            repo.language.as_deref().unwrap_or("Unknown"),
            repo.description.as_deref().unwrap_or("No description"),
            repo.html_url
        ));

        if i < repos.len() - 1 {
            message.push('\n');
        }
    }

    message.push_str(&format!(
        "\nShowing {} repositories{}\n",
        repos.len(),
        if completed { " (end of results)" } else { "" }
    ));

    message
}

pub fn format_number(num: i64) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}k", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}
