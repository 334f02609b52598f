//! Server-side HTML for the single NewsCheck page

use crate::analysis::{AnalysisError, AnalysisKind, AnalysisReport, AnalysisSelection, ResultCard};
use std::fmt::Write;

/// Everything needed to draw the page
#[derive(Debug, Clone, Default)]
pub struct PageState {
    /// Article text to keep in the text area
    pub text: String,
    /// Checkbox state
    pub selection: AnalysisSelection,
    /// Result of the last submission, if any
    pub result: Option<Result<AnalysisReport, AnalysisError>>,
}

impl PageState {
    /// Fresh page with the given default selection
    pub fn new(selection: AnalysisSelection) -> Self {
        Self {
            text: String::new(),
            selection,
            result: None,
        }
    }
}

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;display:flex;color:#262730}\
aside{width:16rem;padding:1.5rem;background:#f0f2f6;min-height:100vh}\
main{flex:1;padding:2rem 3rem}\
textarea{width:100%;height:250px;font-size:1rem}\
button{width:100%;padding:.75rem;font-size:1rem;margin-top:1rem}\
.caption{color:#808495}\
.columns{display:flex;gap:2rem}.columns>div{flex:1}\
.card{background-color:#f8f9fa;padding:1.2rem;border-radius:1rem;margin-bottom:1rem;\
box-shadow:0 1px 4px rgba(0,0,0,0.1)}\
.card h4{margin-bottom:0.5rem}.card p{font-size:1.1rem;margin:0}\
.warning{background:#fffce7;padding:1rem;border-radius:.5rem}\
.success{background:#e8f9ee;padding:1rem;border-radius:.5rem}";

/// Escape text for HTML element and attribute content
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render one result card
pub fn render_card(card: &ResultCard) -> String {
    format!(
        "<div class=\"card\"><h4>{} {}</h4><p>{}</p></div>",
        card.icon,
        escape_html(&card.title),
        escape_html(&card.text())
    )
}

fn render_report(out: &mut String, report: &AnalysisReport) {
    out.push_str("<h3>📊 Analysis Results</h3><div class=\"columns\"><div>");
    for card in report.left() {
        out.push_str(&render_card(card));
    }
    out.push_str("</div><div>");
    for card in report.right() {
        out.push_str(&render_card(card));
    }
    out.push_str("</div></div><p class=\"success\">✅ Analysis complete!</p>");
}

/// Render the full page
pub fn render_page(state: &PageState) -> String {
    let mut out = String::with_capacity(8 * 1024);
    out.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    out.push_str("<title>NewsCheck AI</title>");
    let _ = write!(out, "<style>{STYLE}</style></head><body>");

    out.push_str("<form method=\"post\" action=\"/analyze\" style=\"display:contents\">");

    out.push_str("<aside><h3>⚙️ Options</h3>");
    for kind in AnalysisKind::ALL {
        let checked = if state.selection.is_enabled(kind) {
            " checked"
        } else {
            ""
        };
        let _ = write!(
            out,
            "<label><input type=\"checkbox\" name=\"{}\"{}> Show {}</label><br>",
            kind.key(),
            checked,
            kind.title()
        );
    }
    out.push_str("</aside><main>");

    out.push_str("<h1>📰 NewsCheck AI</h1>");
    out.push_str(
        "<p class=\"caption\">Empowering readers with AI-driven news credibility analysis</p>",
    );
    out.push_str(
        "<p><strong>Welcome!</strong> Paste any news article below and our AI models will \
         analyze it for:</p><ul>",
    );
    for kind in AnalysisKind::ALL {
        let _ = write!(out, "<li>{} <strong>{}</strong></li>", kind.icon(), kind.title());
    }
    out.push_str("</ul>");

    let _ = write!(
        out,
        "<label for=\"text\">📄 Paste your news article here:</label>\
         <textarea id=\"text\" name=\"text\" \
         placeholder=\"Enter or paste your news article text...\">{}</textarea>\
         <button type=\"submit\">🔍 Analyze Article</button>",
        escape_html(&state.text)
    );

    match &state.result {
        Some(Ok(report)) => render_report(&mut out, report),
        Some(Err(error)) => {
            let _ = write!(out, "<p class=\"warning\">⚠️ {}</p>", escape_html(&error.to_string()));
        }
        None => {}
    }

    out.push_str(
        "<hr><small>© 2025 NewsCheck AI Team — Licensed under the Apache License 2.0. \
         Contribute or fork at <a href=\"https://github.com/Nwokike/newscheck-ai\" \
         target=\"_blank\">github.com/Nwokike/newscheck-ai</a>.</small>",
    );
    out.push_str("</main></form></body></html>");
    out
}
