//! The embedded single-page UI.

/// The whole front end: markup, styles, and the fetch glue for `/api/edit`.
pub(crate) const PAGE: &str = r##"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Backdrop</title>
  <style>
    :root {
      --bg: #15171b;
      --panel: #1d2026;
      --line: #343945;
      --input-bg: #262a32;
      --text: #eef1f5;
      --muted: #9aa1ad;
      --accent: #4f8fe8;
      --accent-dim: #3a6cb0;
      --danger-bg: #3a2226;
      --danger-line: #7c3a42;
      --danger-text: #f0b9bf;
    }
    * { box-sizing: border-box; }
    body {
      margin: 0;
      color: var(--text);
      background: var(--bg);
      font-family: system-ui, -apple-system, "Segoe UI", sans-serif;
      font-size: 15px;
    }
    .wrap {
      max-width: 980px;
      margin: 0 auto;
      padding: 24px 16px 48px;
    }
    h1 {
      font-size: 22px;
      margin: 0 0 4px;
    }
    .tagline {
      color: var(--muted);
      margin: 0 0 20px;
      font-size: 13px;
    }
    .panel {
      border: 1px solid var(--line);
      background: var(--panel);
      border-radius: 8px;
      padding: 16px;
      margin-bottom: 16px;
    }
    .field-label {
      display: block;
      font-weight: 600;
      font-size: 13px;
      margin: 0 0 6px;
    }
    .hint {
      color: var(--muted);
      font-size: 12px;
      margin: 4px 0 0;
    }
    input[type=file] {
      width: 100%;
      color: var(--muted);
      font-size: 13px;
    }
    textarea {
      width: 100%;
      min-height: 64px;
      resize: vertical;
      border: 1px solid var(--line);
      border-radius: 6px;
      background: var(--input-bg);
      color: var(--text);
      padding: 8px 10px;
      font: inherit;
      font-size: 13px;
    }
    textarea:focus { outline: none; border-color: var(--accent-dim); }
    .modes {
      display: flex;
      gap: 8px;
      flex-wrap: wrap;
    }
    .mode-btn {
      flex: 1 1 160px;
      border: 1px solid var(--line);
      border-radius: 6px;
      background: var(--input-bg);
      color: var(--text);
      padding: 10px 12px;
      text-align: left;
      cursor: pointer;
      font: inherit;
    }
    .mode-btn .mode-name {
      display: block;
      font-weight: 600;
      font-size: 14px;
      margin-bottom: 2px;
      text-transform: capitalize;
    }
    .mode-btn .mode-desc {
      display: block;
      color: var(--muted);
      font-size: 12px;
    }
    .mode-btn.active {
      border-color: var(--accent);
      background: #24304a;
    }
    .hidden { display: none; }
    .previews {
      display: grid;
      grid-template-columns: 1fr 1fr;
      gap: 16px;
    }
    .preview-slot {
      border: 1px dashed var(--line);
      border-radius: 8px;
      min-height: 240px;
      display: flex;
      align-items: center;
      justify-content: center;
      overflow: hidden;
      background: var(--input-bg);
    }
    .preview-slot img {
      max-width: 100%;
      max-height: 420px;
      display: block;
    }
    .preview-empty {
      color: var(--muted);
      font-size: 13px;
      padding: 12px;
      text-align: center;
    }
    .actions {
      display: flex;
      align-items: center;
      gap: 12px;
      margin-top: 4px;
    }
    .generate {
      border: none;
      border-radius: 6px;
      background: var(--accent);
      color: #fff;
      font-weight: 600;
      font-size: 14px;
      padding: 10px 22px;
      cursor: pointer;
    }
    .generate:hover { background: var(--accent-dim); }
    .generate:disabled {
      opacity: 0.5;
      cursor: default;
    }
    a.download {
      color: var(--accent);
      font-size: 13px;
      text-decoration: none;
      border: 1px solid var(--accent-dim);
      border-radius: 6px;
      padding: 8px 14px;
    }
    .spinner {
      width: 18px;
      height: 18px;
      border: 3px solid var(--line);
      border-top-color: var(--accent);
      border-radius: 50%;
      animation: spin 0.8s linear infinite;
    }
    @keyframes spin { to { transform: rotate(360deg); } }
    .error {
      border: 1px solid var(--danger-line);
      background: var(--danger-bg);
      color: var(--danger-text);
      border-radius: 6px;
      padding: 10px 12px;
      font-size: 13px;
      margin-top: 12px;
      white-space: pre-wrap;
      word-break: break-word;
    }
    .status {
      color: var(--muted);
      font-size: 12px;
    }
    @media (max-width: 720px) {
      .previews { grid-template-columns: 1fr; }
    }
  </style>
</head>
<body>
  <main class="wrap">
    <h1>Backdrop</h1>
    <p class="tagline">Upload a photo, pick a background edit, download the result.</p>

    <section class="panel">
      <label class="field-label" for="photo">Photo</label>
      <input id="photo" type="file" accept="image/png,image/jpeg,image/webp" />
      <p class="hint">PNG, JPEG, or WebP.</p>
    </section>

    <section class="panel">
      <span class="field-label">Background edit</span>
      <div class="modes" id="modes"></div>

      <div id="promptField" class="hidden" style="margin-top: 12px;">
        <label class="field-label" for="prompt">New backdrop</label>
        <textarea id="prompt" placeholder="e.g. a sunlit pine forest with soft morning fog"></textarea>
      </div>

      <div id="referenceField" class="hidden" style="margin-top: 12px;">
        <label class="field-label" for="reference">Backdrop image</label>
        <input id="reference" type="file" accept="image/png,image/jpeg,image/webp" />
        <p class="hint">The subject from your photo is placed onto this backdrop.</p>
      </div>
    </section>

    <section class="panel">
      <div class="actions">
        <button id="generate" class="generate" disabled>Generate</button>
        <div id="spinner" class="spinner hidden"></div>
        <a id="download" class="download hidden" download="backdrop.png">Download</a>
        <span id="status" class="status"></span>
      </div>
      <div id="error" class="error hidden"></div>
    </section>

    <section class="previews">
      <div class="preview-slot" id="beforeSlot">
        <span class="preview-empty">Original appears here</span>
      </div>
      <div class="preview-slot" id="afterSlot">
        <span class="preview-empty">Result appears here</span>
      </div>
    </section>
  </main>

  <script>
    const MODES = [
      { id: 'remove', name: 'Remove', desc: 'Plain white studio backdrop' },
      { id: 'replace', name: 'Replace', desc: 'Describe a new backdrop in text' },
      { id: 'composite', name: 'Composite', desc: 'Use a second image as the backdrop' },
    ];

    const state = { mode: 'remove', file: null, reference: null, busy: false };

    const el = (id) => document.getElementById(id);

    function setError(message) {
      const box = el('error');
      if (message) {
        box.textContent = message;
        box.classList.remove('hidden');
      } else {
        box.textContent = '';
        box.classList.add('hidden');
      }
    }

    function setBusy(busy) {
      state.busy = busy;
      el('spinner').classList.toggle('hidden', !busy);
      el('status').textContent = busy ? 'Generating…' : '';
      syncControls();
    }

    function syncControls() {
      el('generate').disabled = state.busy || !state.file;
      el('promptField').classList.toggle('hidden', state.mode !== 'replace');
      el('referenceField').classList.toggle('hidden', state.mode !== 'composite');
      for (const button of document.querySelectorAll('.mode-btn')) {
        button.classList.toggle('active', button.dataset.mode === state.mode);
      }
    }

    function renderModes() {
      const root = el('modes');
      for (const mode of MODES) {
        const button = document.createElement('button');
        button.type = 'button';
        button.className = 'mode-btn';
        button.dataset.mode = mode.id;
        button.innerHTML =
          '<span class="mode-name">' + mode.name + '</span>' +
          '<span class="mode-desc">' + mode.desc + '</span>';
        button.addEventListener('click', () => {
          state.mode = mode.id;
          setError(null);
          syncControls();
        });
        root.appendChild(button);
      }
    }

    function showPreview(slotId, src) {
      const slot = el(slotId);
      slot.innerHTML = '';
      const img = document.createElement('img');
      img.src = src;
      slot.appendChild(img);
    }

    el('photo').addEventListener('change', (event) => {
      state.file = event.target.files[0] || null;
      setError(null);
      el('download').classList.add('hidden');
      if (state.file) {
        showPreview('beforeSlot', URL.createObjectURL(state.file));
      }
      syncControls();
    });

    el('reference').addEventListener('change', (event) => {
      state.reference = event.target.files[0] || null;
      setError(null);
    });

    el('generate').addEventListener('click', async () => {
      if (state.busy || !state.file) {
        return;
      }
      if (state.mode === 'replace' && !el('prompt').value.trim()) {
        setError('Describe the new backdrop first.');
        return;
      }
      if (state.mode === 'composite' && !state.reference) {
        setError('Choose a backdrop image first.');
        return;
      }

      setError(null);
      el('download').classList.add('hidden');
      setBusy(true);

      try {
        const form = new FormData();
        form.append('image', state.file);
        form.append('mode', state.mode);
        if (state.mode === 'replace') {
          form.append('prompt', el('prompt').value.trim());
        }
        if (state.mode === 'composite') {
          form.append('reference', state.reference);
        }

        const response = await fetch('/api/edit', { method: 'POST', body: form });
        const data = await response.json();
        if (!response.ok || !data.ok) {
          throw new Error(data.error || 'request failed');
        }

        showPreview('afterSlot', data.image);
        const download = el('download');
        download.href = data.image;
        download.download = 'backdrop.' + (data.format || 'png');
        download.classList.remove('hidden');
      } catch (err) {
        setError(err.message);
      } finally {
        setBusy(false);
      }
    });

    renderModes();
    syncControls();
  </script>
</body>
</html>
"##;
