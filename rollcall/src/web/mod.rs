//! ダッシュボードHTMLの生成
//!
//! ライブネスラウンドの結果を1ページのHTMLに描画する。
//! 登録者が送ってきた文字列は全てエスケープして埋め込む。

use crate::common::types::EndpointRecord;
use crate::health::FreshStatus;

const DASHBOARD_CSS: &str = include_str!("../../assets/dashboard.css");

/// 自動リロード間隔（秒）
pub const AUTO_REFRESH_SECS: u64 = 30;

/// 描画時の付帯情報
#[derive(Debug, Clone)]
pub struct DashboardContext {
    /// ダッシュボードのベースURL（例: `http://192.168.1.10:8080`）
    pub base_url: String,
}

impl DashboardContext {
    /// 登録案内用のURL
    pub fn setup_url(&self) -> String {
        format!("{}/register", self.base_url)
    }
}

/// HTML特殊文字をエスケープ
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

fn ssh_code(command: &str) -> String {
    let escaped = escape_html(command);
    format!(r#"<code class="ssh-command" data-command="{escaped}">{escaped}</code>"#)
}

fn render_row(index: usize, record: &EndpointRecord) -> String {
    let status = if record.online {
        r#"<span class="badge online">🟢 Online</span>"#
    } else {
        r#"<span class="badge offline">🔴 Offline</span>"#
    };
    let last_seen = match record.last_seen {
        Some(ts) => format!(
            r#"<time datetime="{}">{}</time>"#,
            ts.to_rfc3339(),
            ts.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => "Never".to_string(),
    };
    let mut commands = ssh_code(&record.ssh_command());
    if let Some(with_port) = record.ssh_command_with_port() {
        commands.push_str("<br>");
        commands.push_str(&ssh_code(&with_port));
    }

    format!(
        r#"
            <tr>
                <td>{}</td>
                <td><strong>{}</strong></td>
                <td>{}</td>
                <td>{}</td>
                <td>{}</td>
                <td>{}</td>
                <td>{}</td>
                <td>{}</td>
            </tr>"#,
        index + 1,
        escape_html(&record.name),
        escape_html(&record.ip),
        record.port,
        escape_html(&record.username),
        status,
        last_seen,
        commands,
    )
}

fn render_table(records: &[EndpointRecord]) -> String {
    let rows: String = records
        .iter()
        .enumerate()
        .map(|(i, r)| render_row(i, r))
        .collect();
    format!(
        r#"
                <table>
                    <thead>
                        <tr>
                            <th>#</th>
                            <th>Name</th>
                            <th>IP Address</th>
                            <th>Port</th>
                            <th>Username</th>
                            <th>Status</th>
                            <th>Last Seen</th>
                            <th>SSH Command</th>
                        </tr>
                    </thead>
                    <tbody>{rows}
                    </tbody>
                </table>"#
    )
}

fn render_empty_state(ctx: &DashboardContext) -> String {
    format!(
        r#"
                <div class="empty-state">
                    <h2>No Hosts Registered Yet</h2>
                    <p>Hosts will appear here once they register with this dashboard</p>
                    <br>
                    <p><strong>Setup URL:</strong> {}</p>
                </div>"#,
        escape_html(&ctx.setup_url())
    )
}

/// ダッシュボードページを描画
pub fn render_dashboard(status: &FreshStatus, ctx: &DashboardContext) -> String {
    let body = if status.records.is_empty() {
        render_empty_state(ctx)
    } else {
        render_table(&status.records)
    };
    let warning = if status.persisted {
        String::new()
    } else {
        r#"<div class="warning">Status could not be saved to disk. Changes shown here were not persisted.</div>"#
            .to_string()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Rollcall Dashboard - SSH Connections</title>
    <style>
{css}
    </style>
</head>
<body>
    <div id="notification"></div>
    <div class="container">
        <div class="header">
            <h1>🎓 Rollcall Dashboard</h1>
            <p>Monitor and connect to registered machines</p>
        </div>

        <div class="stats">
            <div class="stat-card">
                <div class="number">{total}</div>
                <div class="label">Total Hosts</div>
            </div>
            <div class="stat-card">
                <div class="number">{online}</div>
                <div class="label">Online Now</div>
            </div>
            <div class="stat-card">
                <div class="number">{offline}</div>
                <div class="label">Offline</div>
            </div>
        </div>

        <div class="content">
            {warning}
            <div class="controls">
                <button class="btn btn-primary" onclick="location.reload()">🔄 Refresh</button>
                <button class="btn btn-danger" onclick="clearAll()">🗑️ Clear All</button>
            </div>
{body}
        </div>

        <div class="footer">
            <p>Dashboard running on {base_url}</p>
            <p style="margin-top: 10px; font-size: 0.9em;">Auto-refresh every {refresh} seconds</p>
        </div>
    </div>

    <script>
        function showNotification(message) {{
            const notif = document.getElementById('notification');
            notif.textContent = message;
            notif.style.display = 'block';
            setTimeout(() => {{ notif.style.display = 'none'; }}, 3000);
        }}

        document.querySelectorAll('.ssh-command').forEach((el) => {{
            el.addEventListener('click', () => {{
                const text = el.dataset.command;
                navigator.clipboard.writeText(text).then(() => {{
                    showNotification('Copied to clipboard: ' + text);
                }});
            }});
        }});

        document.querySelectorAll('time[datetime]').forEach((el) => {{
            el.textContent = new Date(el.getAttribute('datetime')).toLocaleString();
        }});

        function clearAll() {{
            if (confirm('Are you sure you want to remove all registered hosts?')) {{
                fetch('/api/clear', {{ method: 'POST' }}).then(() => location.reload());
            }}
        }}

        setTimeout(() => location.reload(), {refresh_ms});
    </script>
</body>
</html>
"#,
        css = DASHBOARD_CSS,
        total = status.records.len(),
        online = status.online_count(),
        offline = status.offline_count(),
        warning = warning,
        body = body,
        base_url = escape_html(&ctx.base_url),
        refresh = AUTO_REFRESH_SECS,
        refresh_ms = AUTO_REFRESH_SECS * 1000,
    )
}
