use crate::models::{DashboardView, RenderedRegions};
use crate::render::escape_html;

pub fn render_index(view: &DashboardView) -> String {
    let empty = RenderedRegions {
        timesheet_options: r#"<option value="SSS_Team">SSS Team</option>"#.to_string(),
        customer_job_type: view.job_type.to_string(),
        ..RenderedRegions::default()
    };
    let regions = view.regions.as_ref().unwrap_or(&empty);
    let (status, status_type) = match (&view.status, &view.regions) {
        (Some(message), _) => (escape_html(message), "error"),
        (None, None) => ("Waiting for statistics...".to_string(), "info"),
        (None, Some(_)) => (String::new(), ""),
    };

    fill_template(
        INDEX_HTML,
        &[
            ("LABEL", view.label.as_str()),
            ("TIMESHEET_OPTIONS", regions.timesheet_options.as_str()),
            ("ONSITE_OFFICE", regions.onsite_office.as_str()),
            ("SIDE_PANEL", regions.submission_or_off_days.as_str()),
            ("ROLE_PERCENTAGES", regions.role_percentages.as_str()),
            ("JOB_TYPE", regions.customer_job_type.as_str()),
            ("CUSTOMER_TYPES", regions.customer_types.as_str()),
            ("PROJECT_ROWS", regions.projects.as_str()),
            ("STATUS", status.as_str()),
            ("STATUS_TYPE", status_type),
        ],
    )
}

/// Substitutes `{{KEY}}` markers in one pass so inserted content is never
/// scanned for further markers.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Timesheet Dashboard</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1040px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 24px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(1.8rem, 3.5vw, 2.4rem);
      margin: 0;
    }

    h3 {
      margin: 0 0 8px;
      font-size: 1.05rem;
    }

    .month-year-selector {
      display: flex;
      flex-wrap: wrap;
      justify-content: center;
      align-items: center;
      gap: 14px;
    }

    .month-year-selector form {
      margin: 0;
    }

    #month-year {
      font-size: 1.3rem;
      font-weight: 600;
      min-width: 6ch;
      text-align: center;
    }

    button, select {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 8px 16px;
      font: inherit;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent-2);
      color: white;
    }

    select {
      background: white;
      color: var(--accent-2);
      border: 1px solid rgba(47, 72, 88, 0.2);
    }

    .grid-container {
      display: grid;
      grid-template-columns: repeat(2, 1fr);
      gap: 20px;
    }

    .grid-item {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    .grid-item p {
      margin: 4px 0;
    }

    .grid-item-span-2 {
      grid-column: span 2;
    }

    .button-row {
      display: flex;
      gap: 10px;
      margin-bottom: 10px;
    }

    .customer-type-grid {
      display: grid;
      grid-template-columns: repeat(2, 1fr);
      gap: 5px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th, td {
      text-align: left;
      padding: 8px;
      border-bottom: 1px solid rgba(47, 72, 88, 0.1);
    }

    .status {
      font-size: 0.95rem;
      color: #6b645d;
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    @media (max-width: 720px) {
      .grid-container {
        grid-template-columns: 1fr;
      }
      .grid-item-span-2 {
        grid-column: span 1;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <h1>Timesheet Dashboard</h1>

    <div class="month-year-selector">
      <form method="post" action="/dashboard/prev" data-action="prev_month">
        <button type="submit" id="prev-month">&lt;</button>
      </form>
      <span id="month-year">{{LABEL}}</span>
      <form method="post" action="/dashboard/next" data-action="next_month">
        <button type="submit" id="next-month">&gt;</button>
      </form>
      <form method="post" action="/dashboard/timesheet" data-action="select_timesheet">
        <select id="timesheet-select" name="timesheet_file">{{TIMESHEET_OPTIONS}}</select>
        <noscript><button type="submit">Show</button></noscript>
      </form>
      <form method="post" action="/dashboard/refresh" data-action="refresh">
        <button type="submit">Reload</button>
      </form>
    </div>

    <div class="status" id="status" data-type="{{STATUS_TYPE}}">{{STATUS}}</div>

    <section class="grid-container">
      <div class="grid-item">
        <h3>Working Onsite/Office Percentage</h3>
        <div id="onsite-office">{{ONSITE_OFFICE}}</div>
      </div>
      <div class="grid-item" id="submission-or-off-days">{{SIDE_PANEL}}</div>
      <div class="grid-item">
        <h3>PS/MA/Internal/Pre-Sales Percentage</h3>
        <div id="role-percentages">{{ROLE_PERCENTAGES}}</div>
      </div>
      <div class="grid-item">
        <h3>Customer Type - <span id="selected-job-type">{{JOB_TYPE}}</span></h3>
        <form class="button-row" method="post" action="/dashboard/job-type" data-action="select_job_type">
          <button type="submit" name="job_type" value="PS">PS</button>
          <button type="submit" name="job_type" value="Pre-Sales">Pre-Sales</button>
          <button type="submit" name="job_type" value="MA">MA</button>
        </form>
        <div id="customer-types" class="customer-type-grid">{{CUSTOMER_TYPES}}</div>
      </div>
      <div class="grid-item grid-item-span-2">
        <h3>This Month's Projects</h3>
        <form class="button-row" method="post" action="/dashboard/sort" data-action="sort">
          <button type="submit" name="criteria" value="alpha">Sort by Customer Name</button>
          <button type="submit" name="criteria" value="percentage">Sort by Percentage</button>
        </form>
        <table id="projects-table">
          <thead>
            <tr>
              <th>Customer</th>
              <th>Project Name</th>
              <th>SO</th>
              <th>Frequency</th>
              <th>Percentage</th>
            </tr>
          </thead>
          <tbody id="projects-body">{{PROJECT_ROWS}}</tbody>
        </table>
      </div>
    </section>
  </main>

  <script>
    const statusEl = document.getElementById('status');
    const labelEl = document.getElementById('month-year');
    const regionTargets = [
      ['timesheet_options', 'timesheet-select'],
      ['onsite_office', 'onsite-office'],
      ['submission_or_off_days', 'submission-or-off-days'],
      ['role_percentages', 'role-percentages'],
      ['customer_job_type', 'selected-job-type'],
      ['customer_types', 'customer-types'],
      ['projects', 'projects-body']
    ];

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const applyView = (view) => {
      labelEl.textContent = view.label;
      if (view.regions) {
        regionTargets.forEach(([key, id]) => {
          document.getElementById(id).innerHTML = view.regions[key];
        });
      }
      setStatus(view.status || '', view.status ? 'error' : '');
    };

    const send = async (action, value) => {
      const res = await fetch('/api/dashboard/action', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(value === undefined ? { action } : { action, value })
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      applyView(await res.json());
    };

    document.querySelectorAll('form[data-action]').forEach((form) => {
      form.addEventListener('submit', (event) => {
        event.preventDefault();
        const select = form.querySelector('select');
        let value;
        if (event.submitter && event.submitter.value) {
          value = event.submitter.value;
        } else if (select) {
          value = select.value;
        }
        send(form.dataset.action, value).catch((err) => setStatus(err.message, 'error'));
      });
    });

    document.getElementById('timesheet-select').addEventListener('change', (event) => {
      event.target.form.requestSubmit();
    });
  </script>
</body>
</html>
"#;
