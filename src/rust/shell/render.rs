use std::fmt::Write;

use super::{Panel, View};
use crate::Task;

const APP_TITLE: &str = "لماح";
const BACK_LABEL: &str = "العودة للقائمة الرئيسية";

const STYLE: &str = "body{font-family:sans-serif;max-width:40rem;margin:auto;padding:1rem}\
textarea{width:100%;min-height:8rem}button{width:100%;margin-top:.5rem;padding:.75rem}\
.card{margin-top:1rem;padding:1rem;border-top:5px solid;text-align:center}\
.warning{margin-top:1rem;padding:1rem;background:#fff3cd}\
.error{margin-top:1rem;padding:1rem;background:#f8d7da}";

fn input_prompt(task: Task) -> &'static str {
    match task {
        Task::Sentiment => "أدخل النص للتحليل",
        Task::Article => "أدخل نص المقال",
        Task::Dialect => "أدخل النص باللهجة",
    }
}

fn submit_label(task: Task) -> &'static str {
    match task {
        Task::Article => "تصنيف",
        Task::Sentiment | Task::Dialect => "تحليل",
    }
}

/// Escapes text for use in HTML element content and attribute values
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

fn render_home(body: &mut String) {
    body.push_str("<form method=\"post\" action=\"/\">");
    body.push_str("<input type=\"hidden\" name=\"view\" value=\"home\">");
    for task in Task::ALL {
        let _ = write!(
            body,
            "<button name=\"action\" value=\"select:{}\">{}</button>",
            task.as_str(),
            task.title()
        );
    }
    body.push_str("</form>");
}

fn render_task(body: &mut String, task: Task, text: &str) {
    let _ = write!(body, "<h2>{}</h2>", task.title());
    body.push_str("<form method=\"post\" action=\"/\">");
    let _ = write!(
        body,
        "<input type=\"hidden\" name=\"view\" value=\"{}\">\
         <label for=\"text\">{}</label>\
         <textarea id=\"text\" name=\"text\">{}</textarea>\
         <button name=\"action\" value=\"submit\">{}</button>\
         <button name=\"action\" value=\"back\">{}</button>",
        task.as_str(),
        input_prompt(task),
        escape(text),
        submit_label(task),
        BACK_LABEL
    );
    body.push_str("</form>");
}

fn render_panel(body: &mut String, panel: &Panel) {
    match panel {
        Panel::Nothing => {}
        Panel::Warning(message) => {
            let _ = write!(body, "<div class=\"warning\" role=\"alert\">{}</div>", escape(message));
        }
        Panel::Result(card) => {
            let _ = write!(
                body,
                "<div class=\"card\" style=\"border-color:{}\"><div class=\"card-title\">{}</div><p>{}</p></div>",
                card.color,
                escape(card.title),
                escape(&card.message)
            );
        }
        Panel::Error(message) => {
            let _ = write!(body, "<div class=\"error\" role=\"alert\">{}</div>", escape(message));
        }
    }
}

/// Renders the whole page for a view
pub fn render_page(view: View, panel: &Panel, text: &str) -> String {
    let mut body = String::new();
    let _ = write!(body, "<h1>{}</h1>", APP_TITLE);
    match view.task() {
        None => render_home(&mut body),
        Some(task) => {
            render_task(&mut body, task, text);
            render_panel(&mut body, panel);
        }
    }

    format!(
        "<!DOCTYPE html><html lang=\"ar\" dir=\"rtl\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{}</title><style>{}</style></head><body>{}</body></html>",
        APP_TITLE, STYLE, body
    )
}
