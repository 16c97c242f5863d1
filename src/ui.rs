use crate::models::LifeBar;
use crate::store::Store;
use std::fmt::Write;

pub fn render_index(store: &Store) -> String {
    let active_id = store.active_tab_id();
    let tab_count = store.tabs().len();

    let mut tabs = String::new();
    for tab in store.tabs() {
        let active = if active_id == Some(tab.id.as_str()) { " active" } else { "" };
        let close = if tab_count > 1 {
            r#"<button class="tab-close" data-action="close-tab" title="Close tab">&#10006;</button>"#
                .to_string()
        } else {
            String::new()
        };
        let _ = write!(
            tabs,
            r#"<div class="tab{active}" data-tab-id="{id}"><span class="tab-name" title="Double-click to rename">{name}</span>{close}</div>"#,
            id = escape_html(&tab.id),
            name = escape_html(&tab.name),
        );
    }

    let bars = store
        .active_tab()
        .map(|tab| tab.life_bars.iter().map(render_bar).collect::<String>())
        .unwrap_or_default();
    let empty = if bars.is_empty() { "" } else { " hidden" };

    INDEX_HTML
        .replace("{{TABS}}", &tabs)
        .replace("{{BARS}}", &bars)
        .replace("{{EMPTY_CLASS}}", empty)
}

fn render_bar(bar: &LifeBar) -> String {
    let id = escape_html(&bar.id);
    let portrait = match &bar.profile_image_base64 {
        Some(image) => format!(
            r#"<img class="portrait" src="{}" alt=""><button class="ghost" data-action="clear-image">Remove image</button>"#,
            escape_html(image)
        ),
        None => r#"<span class="portrait placeholder">&#128100;</span>"#.to_string(),
    };
    let life = if bar.temp_life > 0 {
        format!(
            r#"{total} <span class="breakdown">({current} + <span class="temp">{temp}</span>)</span>"#,
            total = bar.total_life(),
            current = bar.current_life,
            temp = bar.temp_life,
        )
    } else {
        bar.current_life.to_string()
    };

    format!(
        r#"<article class="bar-card" draggable="true" data-bar-id="{id}">
  <div class="bar-head">
    <label class="portrait-slot">{portrait}<input type="file" accept="image/*" data-action="image" hidden></label>
    <h3 class="bar-name" data-action="rename-bar" title="Click to rename">{name}</h3>
    <button class="ghost" data-action="delete-bar" title="Delete">&#128465;</button>
  </div>
  <div class="track">
    <div class="fill {health}" style="width: {fill:.2}%"></div>
    <div class="temp-fill" style="left: {fill:.2}%; width: {temp_fill:.2}%"></div>
  </div>
  <p class="life {health}">{life} / <span class="max" data-action="edit-max" title="Click to change max life">{max}</span></p>
  <form class="life-form" data-action="edit-life">
    <input name="input" autocomplete="off" placeholder="+10, -5 or {total}">
    <label class="temp-toggle"><input type="checkbox" name="temporary"> temp</label>
    <button type="submit">Apply</button>
  </form>
</article>"#,
        name = escape_html(&bar.name),
        health = bar.health().css_class(),
        fill = bar.fill_percent(),
        temp_fill = bar.temp_fill_percent(),
        max = bar.max_life,
        total = bar.total_life(),
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '{' => escaped.push_str("&#123;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Life Tracker</title>
  <style>
    :root {
      --bg: #111827;
      --card: #1f2937;
      --ink: #f3f4f6;
      --muted: #9ca3af;
      --healthy: #4ade80;
      --wounded: #facc15;
      --critical: #ef4444;
      --temp: #60a5fa;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 24px 18px 48px;
    }

    .app {
      width: min(900px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 20px;
    }

    .tabs {
      display: flex;
      flex-wrap: wrap;
      gap: 6px;
    }

    .tab {
      display: inline-flex;
      align-items: center;
      gap: 8px;
      padding: 8px 14px;
      border-radius: 999px;
      background: var(--card);
      color: var(--muted);
      cursor: pointer;
    }

    .tab.active {
      background: var(--ink);
      color: var(--bg);
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 8px 14px;
      font-weight: 600;
      cursor: pointer;
      background: var(--temp);
      color: var(--bg);
    }

    button.ghost,
    .tab-close {
      background: transparent;
      color: inherit;
      padding: 2px 6px;
    }

    .bars {
      display: grid;
      gap: 14px;
    }

    .bar-card {
      background: var(--card);
      border-radius: 18px;
      padding: 16px;
      display: grid;
      gap: 10px;
    }

    .bar-card.drag-over {
      outline: 2px dashed var(--temp);
    }

    .bar-head {
      display: flex;
      align-items: center;
      gap: 12px;
    }

    .bar-name {
      flex: 1;
      margin: 0;
      cursor: text;
    }

    .portrait {
      width: 48px;
      height: 48px;
      border-radius: 50%;
      object-fit: cover;
      display: inline-grid;
      place-items: center;
      background: #374151;
      cursor: pointer;
    }

    .track {
      position: relative;
      height: 18px;
      border-radius: 999px;
      background: #374151;
      overflow: hidden;
    }

    .fill,
    .temp-fill {
      position: absolute;
      top: 0;
      bottom: 0;
    }

    .fill {
      left: 0;
    }

    .fill.healthy { background: var(--healthy); }
    .fill.wounded { background: var(--wounded); }
    .fill.critical { background: var(--critical); }
    .temp-fill { background: var(--temp); }

    .life {
      margin: 0;
      font-size: 1.3rem;
      font-weight: 600;
    }

    .life.healthy { color: var(--healthy); }
    .life.wounded { color: var(--wounded); }
    .life.critical { color: var(--critical); }
    .life .breakdown { color: var(--muted); font-size: 0.9rem; }
    .life .temp { color: var(--temp); }
    .life .max { color: var(--temp); cursor: pointer; }

    .life-form,
    .add-form {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
    }

    input[type="text"],
    input:not([type]) {
      border-radius: 10px;
      border: 1px solid #4b5563;
      background: #111827;
      color: var(--ink);
      padding: 8px 10px;
    }

    .empty.hidden {
      display: none;
    }

    .status {
      min-height: 1.2em;
      color: var(--critical);
    }
  </style>
</head>
<body>
  <main class="app">
    <nav class="tabs" id="tabs">{{TABS}}<button id="add-tab" title="New tab">+</button></nav>
    <form class="add-form" id="add-bar">
      <input name="name" placeholder="Name" required>
      <input name="max_life" placeholder="Max life" inputmode="numeric">
      <button type="submit">Add life bar</button>
    </form>
    <p class="status" id="status"></p>
    <p class="empty{{EMPTY_CLASS}}">No life bars in this tab yet.</p>
    <section class="bars" id="bars">{{BARS}}</section>
  </main>

  <script>
    const statusEl = document.getElementById('status');

    const setStatus = (message) => {
      statusEl.textContent = message || '';
    };

    const post = async (path, body) => {
      const response = await fetch(path, {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(body || {}),
      });
      if (!response.ok) {
        throw new Error(await response.text());
      }
      return response.json();
    };

    const run = async (path, body) => {
      try {
        await post(path, body);
        window.location.reload();
      } catch (err) {
        setStatus(err.message);
      }
    };

    const enc = encodeURIComponent;

    document.getElementById('add-tab').addEventListener('click', () => run('/api/tabs', {}));

    document.querySelectorAll('.tab').forEach((tabEl) => {
      const id = tabEl.dataset.tabId;
      tabEl.addEventListener('click', () => run(`/api/tabs/${enc(id)}/activate`));
      tabEl.querySelector('.tab-name').addEventListener('dblclick', (e) => {
        e.stopPropagation();
        const name = prompt('Tab name', e.target.textContent);
        if (name !== null) run(`/api/tabs/${enc(id)}/rename`, { name });
      });
      const close = tabEl.querySelector('[data-action="close-tab"]');
      if (close) {
        close.addEventListener('click', async (e) => {
          e.stopPropagation();
          try {
            const result = await post(`/api/tabs/${enc(id)}/delete`);
            if (result.outcome === 'confirm') {
              if (!confirm(`Close "${result.tab_name}" and all of its life bars?`)) return;
              await post(`/api/tabs/${enc(id)}/delete/confirm`);
            }
            window.location.reload();
          } catch (err) {
            setStatus(err.message);
          }
        });
      }
    });

    document.getElementById('add-bar').addEventListener('submit', (e) => {
      e.preventDefault();
      const form = new FormData(e.target);
      run('/api/bars', { name: form.get('name'), max_life: form.get('max_life') });
    });

    const PORTRAIT_SIZE = 256;
    let draggedId = null;

    document.querySelectorAll('.bar-card').forEach((card) => {
      const id = card.dataset.barId;
      const base = `/api/bars/${enc(id)}`;

      card.querySelector('[data-action="rename-bar"]').addEventListener('click', (e) => {
        const name = prompt('Name', e.target.textContent);
        if (name !== null) run(`${base}/rename`, { name });
      });
      card.querySelector('[data-action="edit-max"]').addEventListener('click', (e) => {
        const input = prompt('Max life (+5, -5 or a new value)', e.target.textContent);
        if (input !== null && input.trim()) run(`${base}/max-life`, { input });
      });
      card.querySelector('[data-action="delete-bar"]').addEventListener('click', () => run(`${base}/delete`));

      const clear = card.querySelector('[data-action="clear-image"]');
      if (clear) {
        clear.addEventListener('click', (e) => {
          e.preventDefault();
          run(`${base}/image/clear`);
        });
      }

      card.querySelector('[data-action="image"]').addEventListener('change', (e) => {
        const file = e.target.files[0];
        if (!file) return;
        const url = URL.createObjectURL(file);
        const img = new Image();
        img.onload = () => {
          const side = Math.min(img.naturalWidth, img.naturalHeight);
          const canvas = document.createElement('canvas');
          canvas.width = PORTRAIT_SIZE;
          canvas.height = PORTRAIT_SIZE;
          canvas.getContext('2d').drawImage(
            img,
            (img.naturalWidth - side) / 2,
            (img.naturalHeight - side) / 2,
            side,
            side,
            0,
            0,
            PORTRAIT_SIZE,
            PORTRAIT_SIZE,
          );
          URL.revokeObjectURL(url);
          run(`${base}/image`, { data: canvas.toDataURL('image/png') });
        };
        img.onerror = () => {
          URL.revokeObjectURL(url);
          setStatus('Could not read the image file.');
        };
        img.src = url;
      });

      card.querySelector('[data-action="edit-life"]').addEventListener('submit', async (e) => {
        e.preventDefault();
        const form = new FormData(e.target);
        run(`${base}/life`, { input: form.get('input') || '', temporary: form.get('temporary') === 'on' });
      });

      card.addEventListener('dragstart', (e) => {
        draggedId = id;
        e.dataTransfer.setData('text/plain', id);
        e.dataTransfer.effectAllowed = 'move';
      });
      card.addEventListener('dragend', () => {
        draggedId = null;
        document.querySelectorAll('.drag-over').forEach((el) => el.classList.remove('drag-over'));
      });
      card.addEventListener('dragover', (e) => e.preventDefault());
      card.addEventListener('dragenter', () => {
        if (draggedId && draggedId !== id) card.classList.add('drag-over');
      });
      card.addEventListener('dragleave', () => card.classList.remove('drag-over'));
      card.addEventListener('drop', (e) => {
        e.preventDefault();
        card.classList.remove('drag-over');
        const dropped = draggedId || e.dataTransfer.getData('text/plain');
        if (dropped && dropped !== id) run('/api/bars/reorder', { dragged_id: dropped, target_id: id });
      });
    });
  </script>
</body>
</html>
"#;
