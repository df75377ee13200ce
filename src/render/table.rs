use crate::domain::model::MediaRecord;

pub const TABLE_COLUMNS: [&str; 10] = [
    "Hashtag",
    "Username",
    "View Count",
    "Like Count",
    "Comment Count",
    "Post URL",
    "Profile URL",
    "Region",
    "Follower Count",
    "Date",
];

pub const NO_RESULTS: &str = "No results.";

/// Line breaks in free text would split a row, so they become spaces.
fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

fn cells(record: &MediaRecord) -> [String; 10] {
    let text = |v: &Option<String>| {
        v.as_deref()
            .map(single_line)
            .unwrap_or_else(|| "-".to_string())
    };
    [
        text(&record.hashtag),
        text(&record.username),
        record.view_count.to_string(),
        record.like_count.to_string(),
        record.comment_count.to_string(),
        text(&record.post_url),
        text(&record.profile_url),
        text(&record.region),
        record.follower_count.to_string(),
        record.date_label(),
    ]
}

/// Fixed-width text table, one line per record under a header and a rule.
pub fn render_table(records: &[MediaRecord]) -> String {
    if records.is_empty() {
        return NO_RESULTS.to_string();
    }

    let header: Vec<String> = TABLE_COLUMNS.iter().map(|c| c.to_string()).collect();
    let rows: Vec<Vec<String>> = records.iter().map(|r| cells(r).to_vec()).collect();
    render_grid(&header, &rows)
}

/// Two-column key/value table used for profiles.
pub fn render_key_values(pairs: &[(String, String)]) -> String {
    let header = vec!["Field".to_string(), "Value".to_string()];
    let rows: Vec<Vec<String>> = pairs
        .iter()
        .map(|(k, v)| vec![k.clone(), single_line(v)])
        .collect();
    render_grid(&header, &rows)
}

fn render_grid(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(header));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.extend(rows.iter().map(|row| line(row.as_slice())));
    out.join("\n")
}
