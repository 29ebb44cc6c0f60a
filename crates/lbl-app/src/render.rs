//! HTML pages

use std::fmt::Write;

use lbl_core::{Annotator, Completion, RowView, LABELS};

use crate::markdown::render_markdown;

pub const APP_TITLE: &str = "CSV Labeling Tool";

const STYLE: &str = r#"
:root { --bg:#0b0f17; --card:#121a2a; --card2:#0f1524; --text:#e6e9f2; --muted:#a9b1c7;
        --border:#24304b; --accent:#6ea8fe; --good:#8be9a8; --danger:#ff7d7d; }
body { margin:0; font-family:system-ui,-apple-system,"Segoe UI",Roboto,Helvetica,Arial,sans-serif;
       background:var(--bg); color:var(--text); }
a { color:var(--accent); text-decoration:none; }
.container { max-width:1100px; margin:0 auto; padding:24px; }
.header { display:flex; justify-content:space-between; align-items:center; gap:16px; margin-bottom:18px; }
.title { font-size:20px; font-weight:700; }
.pill { display:inline-block; padding:6px 10px; border:1px solid var(--border); border-radius:999px; color:var(--muted); }
.panel { border:1px solid var(--border); border-radius:14px; padding:18px; background:rgba(255,255,255,0.02); }
.row { display:flex; gap:16px; flex-wrap:wrap; }
.col { flex:1 1 340px; }
label { display:block; font-size:13px; color:var(--muted); margin:10px 0 6px 0; }
input, select { width:100%; box-sizing:border-box; padding:10px 12px; border-radius:10px;
                border:1px solid var(--border); background:var(--card2); color:var(--text); }
button, .btn { border:1px solid var(--border); background:var(--card); color:var(--text);
               padding:10px 14px; border-radius:10px; cursor:pointer; font-weight:600; }
.btn-primary { border-color:rgba(110,168,254,0.7); }
.btn-danger { border-color:rgba(255,125,125,0.7); }
.btn-row { display:flex; gap:10px; flex-wrap:wrap; align-items:center; }
.muted { color:var(--muted); }
.small { font-size:12px; }
.center { text-align:center; }
.spacer { height:14px; }
.notice { margin:0 0 14px 0; padding:10px 12px; border-radius:10px; border:1px solid rgba(255,210,125,0.6);
          background:rgba(255,210,125,0.08); }
.meta { display:flex; flex-wrap:wrap; gap:8px; margin-bottom:12px; }
.textbox { line-height:1.5; font-size:15px; padding:14px; border-radius:12px; border:1px solid var(--border);
           max-height:320px; overflow:auto; }
.grid { display:grid; grid-template-columns:repeat(2, minmax(0, 1fr)); gap:10px; margin-top:14px; }
@media (max-width:850px) { .grid { grid-template-columns:1fr; } }
.labelcard { width:100%; height:100%; text-align:left; border-radius:12px; background:rgba(255,255,255,0.02); }
.labelcard.selected { border-color:rgba(139,233,168,0.85); background:rgba(139,233,168,0.08); }
.labelkey { font-size:12px; color:var(--muted); margin-bottom:6px; }
.labeldesc { font-size:14px; font-weight:400; }
.progresswrap { display:flex; align-items:center; gap:12px; flex-wrap:wrap; margin-top:16px; }
.progressbar { flex:1 1 360px; height:12px; border-radius:999px; border:1px solid var(--border); overflow:hidden; }
.progressfill { height:100%; background:rgba(110,168,254,0.75); }
.jump { display:flex; gap:10px; align-items:center; }
.jump input { width:110px; }
.footerrow { display:flex; justify-content:space-between; align-items:center; flex-wrap:wrap; gap:12px; margin-top:14px; }
"#;

/// Progress of one annotator on the start page
#[derive(Debug, Clone)]
pub struct CoderStat {
    pub annotator: Annotator,
    pub name: String,
    pub completion: Completion,
}

/// Data for the start page
#[derive(Debug, Clone, Default)]
pub struct IndexPage {
    /// Table dimensions as (rows, columns), if one is loaded
    pub table_shape: Option<(usize, usize)>,
    pub stats: Vec<CoderStat>,
    /// Display names in annotator order
    pub names: Vec<String>,
}

/// Escape text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, has_table: bool, notice: Option<&str>, body: &str) -> String {
    let download = if has_table {
        r#"<a class="btn" href="/download">Download CSV</a>"#
    } else {
        ""
    };
    let notice = notice
        .filter(|n| !n.trim().is_empty())
        .map(|n| format!(r#"<div class="notice">{}</div>"#, escape_html(n)))
        .unwrap_or_default();

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{title}</title>
  <style>{style}</style>
</head>
<body>
  <div class="container">
    <div class="header">
      <div class="title">{title}</div>
      <div class="btn-row">{download}<a class="btn" href="/">Start</a></div>
    </div>
    {notice}
    {body}
  </div>
</body>
</html>
"#,
        title = escape_html(title),
        style = STYLE,
        download = download,
        notice = notice,
        body = body,
    )
}

/// Start page: upload, annotator selection, display names
pub fn index_page(page: &IndexPage, notice: Option<&str>) -> String {
    let has_table = page.table_shape.is_some();
    let disabled = if has_table { "" } else { " disabled" };
    let name = |annotator: Annotator| -> String {
        page.names
            .get(usize::from(annotator.number()) - 1)
            .cloned()
            .unwrap_or_else(|| annotator.default_name())
    };

    let mut body = String::new();

    body.push_str(r#"<div class="panel">"#);
    match page.table_shape {
        None => body.push_str(r#"<div class="muted">No CSV loaded yet. Upload a CSV to start.</div>"#),
        Some((rows, columns)) => {
            let _ = write!(
                body,
                r#"<div class="meta"><span class="pill">Rows: <b>{}</b></span><span class="pill">Columns: <b>{}</b></span><span class="pill">Required column: <b>text</b></span></div>
<div class="muted small">Labels are written straight into the loaded CSV, in the column of the selected coder.</div>"#,
                rows, columns
            );
        }
    }
    body.push_str(r#"</div><div class="spacer"></div><div class="row">"#);

    body.push_str(
        r#"<div class="col panel">
  <div class="title">1) Choose CSV</div>
  <form action="/upload" method="post" enctype="multipart/form-data">
    <label>Upload CSV</label>
    <input type="file" name="file" accept=".csv,text/csv" required />
    <div class="spacer"></div>
    <button class="btn-primary" type="submit">Load / replace CSV</button>
  </form>
  <div class="muted small" style="margin-top:12px;">Uploading replaces the current data. Missing coder columns are added automatically.</div>
</div>"#,
    );

    let _ = write!(
        body,
        r#"<div class="col panel"><div class="title">2) Choose coder</div>
<form action="/start" method="get"><label>Coder</label><select name="coder"{}>"#,
        disabled
    );
    for annotator in Annotator::ALL {
        let _ = write!(
            body,
            r#"<option value="{}">{} ({})</option>"#,
            annotator,
            escape_html(&name(annotator)),
            annotator.column_name()
        );
    }
    body.push_str("</select>");
    if has_table {
        body.push_str(r#"<div class="muted small" style="margin-top:12px;">Progress per coder:</div><div class="meta">"#);
        for stat in &page.stats {
            let _ = write!(
                body,
                r#"<span class="pill">{}: <b>{}</b>/{}</span>"#,
                escape_html(&stat.name),
                stat.completion.done,
                stat.completion.total
            );
        }
        body.push_str("</div>");
    }
    let _ = write!(
        body,
        r#"<div class="spacer"></div><button class="btn-primary" type="submit"{}>Start / resume labeling</button></form></div></div>"#,
        disabled
    );

    body.push_str(r#"<div class="spacer"></div><div class="title">Coder names (display only)</div><form action="/settings/coder-names" method="post"><div class="row">"#);
    for chunk in Annotator::ALL.chunks(3) {
        body.push_str(r#"<div class="col">"#);
        for annotator in chunk {
            let _ = write!(
                body,
                r#"<label>Coder {n} name</label><input name="name{n}" value="{value}" />"#,
                n = annotator,
                value = escape_html(&name(*annotator))
            );
        }
        body.push_str("</div>");
    }
    body.push_str(
        r#"</div><div class="spacer"></div><button class="btn" type="submit">Save names</button>
<div class="muted small" style="margin-top:8px;">Names only change what the UI shows. CSV columns stay the same.</div></form>"#,
    );

    layout(APP_TITLE, has_table, notice, &body)
}

/// Labeling page for one row
pub fn label_page(annotator: Annotator, coder_name: &str, view: &RowView, notice: Option<&str>) -> String {
    let n = view.total();
    let mut body = String::new();

    let _ = write!(
        body,
        r#"<div class="panel"><div class="meta">
<span class="pill">Coder: <b>{name}</b> &rarr; <span class="muted">{column}</span></span>
<span class="pill">Row: <b>{idx}</b>/{n}</span>
<span class="pill">Labeled: <b>{done}</b>/{n}</span>
</div>
<div class="textbox">{text}</div>
<div class="grid">"#,
        name = escape_html(coder_name),
        column = annotator.column_name(),
        idx = view.display_index(),
        n = n,
        done = view.completion.done,
        text = render_markdown(&view.text),
    );

    for label in LABELS {
        let selected = if view.current_label == label.key() { " selected" } else { "" };
        let _ = write!(
            body,
            r#"<form method="post" action="/set_label">
<input type="hidden" name="coder" value="{coder}" /><input type="hidden" name="idx" value="{idx}" /><input type="hidden" name="label" value="{key}" />
<button class="labelcard{selected}" type="submit"><div class="labelkey">{key}</div><div class="labeldesc">{desc}</div></button>
</form>"#,
            coder = annotator,
            idx = view.index,
            key = label.key(),
            selected = selected,
            desc = escape_html(label.description()),
        );
    }

    let current = if view.current_label.is_empty() {
        "&mdash;".to_string()
    } else {
        format!(
            r#"{}<span class="muted"> (click another label to overwrite)</span>"#,
            escape_html(&view.current_label)
        )
    };

    let _ = write!(
        body,
        r#"</div>
<div class="progresswrap">
  <div class="progressbar" aria-label="Progress"><div class="progressfill" style="width:{pct}%;"></div></div>
  <div class="btn-row">
    <a class="btn" href="/label?coder={coder}&amp;idx={prev}">&larr; Back</a>
    <a class="btn" href="/label?coder={coder}&amp;idx={next}">Next &rarr;</a>
  </div>
  <form class="jump" method="get" action="/label">
    <input type="hidden" name="coder" value="{coder}" />
    <input type="number" name="idx" min="1" max="{n}" value="{idx}" />
    <button class="btn" type="submit">Jump</button>
  </form>
</div>
<div class="footerrow">
  <div class="muted small">Current label: <b>{current}</b></div>
  <form method="post" action="/clear_label">
    <input type="hidden" name="coder" value="{coder}" /><input type="hidden" name="idx" value="{row}" />
    <button class="btn-danger" type="submit">Remove label</button>
  </form>
</div>
</div>"#,
        pct = view.completion.percent(),
        coder = annotator,
        prev = view.prev + 1,
        next = view.next + 1,
        n = n,
        idx = view.display_index(),
        current = current,
        row = view.index,
    );

    let title = format!("{} - Coder {}", APP_TITLE, annotator);
    layout(&title, true, notice, &body)
}

/// Completion page shown once every row has a label
pub fn done_page(annotator: Annotator, coder_name: &str, restart_row: usize, notice: Option<&str>) -> String {
    let body = format!(
        r#"<div class="panel center">
  <div class="title">Thank you.</div>
  <div class="muted" style="margin:8px 0 14px 0;">Every row is labeled for <b>{name}</b>.</div>
  <div class="btn-row" style="justify-content:center;">
    <a class="btn btn-primary" href="/download">Download CSV</a>
    <a class="btn" href="/label?coder={coder}&amp;idx={restart}">Start over</a>
    <a class="btn" href="/">Back to start</a>
  </div>
  <div class="muted small" style="margin-top:10px;">Starting over opens the view at row {restart} again.</div>
</div>"#,
        name = escape_html(coder_name),
        coder = annotator,
        restart = restart_row + 1,
    );

    let title = format!("{} - Done", APP_TITLE);
    layout(&title, true, notice, &body)
}
