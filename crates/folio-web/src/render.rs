//! Page renderers.

use crate::route::{Handler, RouteTable};
use folio_engine::{ComicPage, Page};
use folio_store::DocumentPage;
use std::fmt::Write;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    #[error("template `{template}` cannot render a {kind} page")]
    PageMismatch {
        template: String,
        kind: &'static str,
    },
}

pub trait Renderer: Send + Sync {
    fn render(&self, template: &str, page: &Page) -> Result<Vec<u8>, RenderError>;
}

/// Built-in HTML templates: `view`, `edit`, `comic`.
///
/// Links and form actions point at whatever operations the route table
/// mounts; a link to an unmounted operation is left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlRenderer {
    edit_op: Option<String>,
    save_op: Option<String>,
    comic_op: Option<String>,
    comment_op: Option<String>,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self {
            edit_op: Some("edit".to_string()),
            save_op: Some("save".to_string()),
            comic_op: Some("xkcd".to_string()),
            comment_op: Some("comment".to_string()),
        }
    }
}

impl HtmlRenderer {
    pub fn for_routes(routes: &RouteTable) -> Self {
        let op = |handler| routes.operation_for(handler).map(str::to_string);
        Self {
            edit_op: op(Handler::EditDocument),
            save_op: op(Handler::SaveDocument),
            comic_op: op(Handler::ShowComic),
            // The save handler also accepts comment forms.
            comment_op: op(Handler::PostComment).or_else(|| op(Handler::SaveDocument)),
        }
    }

    fn view(&self, page: &DocumentPage) -> String {
        let title = escape_html(&page.title);
        let mut html = open_document(&title);
        let _ = writeln!(html, "<h1>{title}</h1>");
        if let Some(edit) = &self.edit_op {
            let _ = writeln!(html, "<p>[<a href=\"/{edit}/{}\">edit</a>]</p>", page.id);
        }
        let _ = writeln!(html, "<div>{}</div>", escape_html(&page.body_text()));
        close_document(html)
    }

    fn edit(&self, page: &DocumentPage) -> String {
        let title = escape_html(&page.title);
        let mut html = open_document(&format!("Editing {title}"));
        let _ = writeln!(html, "<h1>Editing {title}</h1>");
        if let Some(save) = &self.save_op {
            let _ = writeln!(html, "<form action=\"/{save}/{}\" method=\"POST\">", page.id);
            let _ = writeln!(
                html,
                "<div><textarea name=\"body\" rows=\"20\" cols=\"80\">{}</textarea></div>",
                escape_html(&page.body_text())
            );
            html.push_str("<div><input type=\"submit\" value=\"Save\"></div>\n</form>\n");
        }
        close_document(html)
    }

    fn comic(&self, page: &ComicPage) -> String {
        let safe_title = escape_html(&page.safe_title);
        let alt = escape_html(&page.alt);
        let mut html = open_document(&safe_title);
        let _ = writeln!(html, "<h1>{safe_title}</h1>");
        let _ = writeln!(
            html,
            "<figure><img src=\"{}\" alt=\"{}\" title=\"{alt}\"><figcaption>{alt}</figcaption></figure>",
            escape_html(&page.image_url),
            escape_html(&page.title),
        );
        match &self.comic_op {
            Some(comic) => {
                let _ = writeln!(
                    html,
                    "<p>#{} [<a href=\"/{comic}/\">random</a>]</p>",
                    page.number
                );
            }
            None => {
                let _ = writeln!(html, "<p>#{}</p>", page.number);
            }
        }
        if !page.transcript.is_empty() {
            let _ = writeln!(html, "<pre>{}</pre>", escape_html(&page.transcript));
        }

        html.push_str("<h2>Comments</h2>\n");
        if page.comments.is_empty() {
            html.push_str("<p>No comments yet.</p>\n");
        } else {
            html.push_str("<ul>\n");
            for comment in &page.comments {
                let _ = writeln!(html, "<li>{}</li>", escape_html(comment));
            }
            html.push_str("</ul>\n");
        }

        if let Some(comment) = &self.comment_op {
            let _ = writeln!(
                html,
                "<form action=\"/{comment}/{}\" method=\"POST\">",
                page.number
            );
            html.push_str("<div><textarea name=\"comment\" rows=\"4\" cols=\"80\"></textarea></div>\n");
            html.push_str("<div><input type=\"submit\" value=\"Comment\"></div>\n</form>\n");
        }
        close_document(html)
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, template: &str, page: &Page) -> Result<Vec<u8>, RenderError> {
        let html = match (template, page) {
            ("view", Page::Document(doc)) => self.view(doc),
            ("edit", Page::Document(doc)) => self.edit(doc),
            ("comic", Page::Comic(comic)) => self.comic(comic),
            ("view" | "edit" | "comic", page) => {
                return Err(RenderError::PageMismatch {
                    template: template.to_string(),
                    kind: page.kind(),
                });
            }
            (other, _) => return Err(RenderError::UnknownTemplate(other.to_string())),
        };
        Ok(html.into_bytes())
    }
}

fn open_document(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n"
    )
}

fn close_document(mut html: String) -> String {
    html.push_str("</body>\n</html>\n");
    html
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
