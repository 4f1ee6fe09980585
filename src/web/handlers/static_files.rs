use axum::{
    response::{Html, IntoResponse},
};

// Serve the single-page UI. All rendering happens server-side; the page only
// forwards form changes and shows the latest canvas.
pub async fn serve_index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>qrsmith - QR Studio</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, 'Open Sans', 'Helvetica Neue', sans-serif;
            max-width: 900px;
            margin: 0 auto;
            padding: 20px;
            color: #333;
        }
        h1 {
            color: #2c3e50;
            text-align: center;
        }
        .container {
            display: flex;
            flex-wrap: wrap;
            gap: 20px;
        }
        .card {
            flex: 1 1 360px;
            border: 1px solid #ddd;
            border-radius: 8px;
            padding: 20px;
            box-shadow: 0 2px 4px rgba(0, 0, 0, 0.1);
        }
        label {
            display: block;
            margin-top: 12px;
            font-weight: 600;
        }
        input[type=text], input[type=number] {
            width: 100%;
            box-sizing: border-box;
            padding: 8px;
        }
        .row {
            display: flex;
            gap: 12px;
        }
        .row > div {
            flex: 1;
        }
        .drop-area {
            margin-top: 8px;
            border: 2px dashed #3498db;
            border-radius: 8px;
            padding: 20px;
            text-align: center;
            cursor: pointer;
            transition: border-color 0.3s ease, background-color 0.3s ease;
        }
        .drop-area.active {
            background-color: #e3f2fd;
            border-color: #1976d2;
        }
        #logo-input {
            display: none;
        }
        .button {
            background-color: #3498db;
            color: white;
            border: none;
            padding: 10px 15px;
            border-radius: 4px;
            cursor: pointer;
            font-size: 16px;
            margin-top: 16px;
        }
        .button:hover {
            background-color: #2980b9;
        }
        .button.secondary {
            background-color: #95a5a6;
        }
        .preview {
            display: flex;
            align-items: center;
            justify-content: center;
            min-height: 320px;
        }
        .preview img {
            max-width: 100%;
            image-rendering: pixelated;
        }
        #status {
            min-height: 1.2em;
            color: #c0392b;
            margin-top: 12px;
        }
    </style>
</head>
<body>
    <h1>qrsmith</h1>
    <div class="container">
        <div class="card">
            <label for="text">Text or URL</label>
            <input type="text" id="text" placeholder="https://example.com">

            <div class="row">
                <div>
                    <label for="size">Size (px)</label>
                    <input type="number" id="size" min="128" max="1200" value="400">
                </div>
                <div>
                    <label for="border">Border (px)</label>
                    <input type="number" id="border" min="0" value="4">
                </div>
            </div>

            <div class="row">
                <div>
                    <label for="fg">Foreground</label>
                    <input type="color" id="fg" value="#000000">
                </div>
                <div>
                    <label for="bg">Background</label>
                    <input type="color" id="bg" value="#ffffff">
                </div>
            </div>

            <label for="logo-scale">Logo scale</label>
            <input type="range" id="logo-scale" min="0" max="0.5" step="0.01" value="0.18">

            <label>Logo</label>
            <div class="drop-area" id="drop-area">
                <p id="logo-label">Click or drop an image here</p>
                <input type="file" id="logo-input" accept="image/*">
            </div>

            <button type="button" class="button" id="preview-btn">Preview</button>
            <button type="button" class="button" id="download-btn">Download PNG</button>
            <button type="button" class="button secondary" id="reset-btn">Reset logo</button>
            <div id="status"></div>
        </div>

        <div class="card preview">
            <p id="placeholder">Your QR code will appear here</p>
            <img id="qr-preview" alt="QR preview" style="display: none">
        </div>
    </div>

    <script>
        const $ = (id) => document.getElementById(id);
        let sessionId = null;
        let shownToken = 0;

        function formValues() {
            return {
                text: $('text').value,
                size: $('size').value,
                border: $('border').value,
                fg: $('fg').value,
                bg: $('bg').value,
                logo_scale: $('logo-scale').value,
            };
        }

        function showStatus(msg) {
            $('status').textContent = msg || '';
        }

        async function api(path, options = {}) {
            const response = await fetch(`/api/sessions/${sessionId}${path}`, options);
            if (response.status === 404 && path === '') {
                await createSession();
            }
            return response;
        }

        async function readError(response) {
            try {
                const body = await response.json();
                return body.message || `Error ${response.status}`;
            } catch (_) {
                return `Error ${response.status}`;
            }
        }

        function jsonRequest(method) {
            return {
                method,
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify(formValues()),
            };
        }

        async function refreshStatus() {
            const response = await api('');
            if (!response.ok) return;
            const view = await response.json();
            showStatus(view.state === 'error' ? view.message : '');
            $('logo-label').textContent = view.has_logo ? 'Logo loaded - drop another to replace' : 'Click or drop an image here';
        }

        async function showCanvas() {
            const response = await api('/canvas');
            if (!response.ok || response.status === 204) return;
            displayPng(response);
        }

        async function displayPng(response) {
            shownToken = Number(response.headers.get('x-render-token') || shownToken);
            const blob = await response.blob();
            const img = $('qr-preview');
            if (img.src) URL.revokeObjectURL(img.src);
            img.src = URL.createObjectURL(blob);
            img.style.display = 'block';
            $('placeholder').style.display = 'none';
        }

        // Long-poll for frames produced by debounced updates.
        async function watchCanvas() {
            while (true) {
                try {
                    const response = await api(`/canvas?after=${shownToken}`);
                    if (response.ok && response.status !== 204) {
                        await displayPng(response);
                        await refreshStatus();
                    } else if (!response.ok) {
                        await new Promise(r => setTimeout(r, 1000));
                    }
                } catch (error) {
                    console.error('Canvas watch failed:', error);
                    await new Promise(r => setTimeout(r, 1000));
                }
            }
        }

        async function liveUpdate() {
            if ($('text').value.trim() === '') return;
            await api('/params', jsonRequest('PUT'));
        }

        async function preview() {
            const response = await api('/preview', jsonRequest('POST'));
            if (!response.ok) {
                showStatus(await readError(response));
                return;
            }
            showStatus('');
            await showCanvas();
        }

        async function download() {
            const response = await api('/export', jsonRequest('POST'));
            if (!response.ok) {
                showStatus(await readError(response));
                return;
            }
            const disposition = response.headers.get('content-disposition') || '';
            const match = disposition.match(/filename="([^"]+)"/);
            const blob = await response.blob();
            const link = document.createElement('a');
            link.href = URL.createObjectURL(blob);
            link.download = match ? match[1] : 'qrcode.png';
            link.click();
            URL.revokeObjectURL(link.href);
            await showCanvas();
        }

        async function uploadLogo(file) {
            if (!file) return;
            const formData = new FormData();
            formData.append('logo', file);
            const response = await api('/logo', { method: 'POST', body: formData });
            if (!response.ok) {
                showStatus(await readError(response));
            }
            await refreshStatus();
            await showCanvas();
        }

        async function resetLogo() {
            $('logo-input').value = '';
            await api('/logo', { method: 'DELETE' });
            await refreshStatus();
            await showCanvas();
        }

        async function createSession() {
            const response = await fetch('/api/sessions', { method: 'POST' });
            const created = await response.json();
            sessionId = created.id;
            shownToken = 0;
            const d = created.defaults;
            $('size').value = d.size;
            $('border').value = d.border;
            $('fg').value = d.fg;
            $('bg').value = d.bg;
            $('logo-scale').value = d.logo_scale;
        }

        document.addEventListener('DOMContentLoaded', async () => {
            await createSession();

            ['text', 'size', 'border', 'fg', 'bg', 'logo-scale'].forEach(id => {
                $(id).addEventListener('input', liveUpdate);
            });

            $('preview-btn').addEventListener('click', preview);
            $('download-btn').addEventListener('click', download);
            $('reset-btn').addEventListener('click', resetLogo);

            const dropArea = $('drop-area');
            const logoInput = $('logo-input');
            dropArea.addEventListener('click', () => logoInput.click());
            logoInput.addEventListener('change', () => uploadLogo(logoInput.files[0]));
            dropArea.addEventListener('dragover', (e) => {
                e.preventDefault();
                dropArea.classList.add('active');
            });
            dropArea.addEventListener('dragleave', () => dropArea.classList.remove('active'));
            dropArea.addEventListener('drop', (e) => {
                e.preventDefault();
                dropArea.classList.remove('active');
                if (e.dataTransfer.files.length > 0) {
                    uploadLogo(e.dataTransfer.files[0]);
                }
            });

            watchCanvas();
        });
    </script>
</body>
</html>"##;
