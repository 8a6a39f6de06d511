pub fn render_index(today: &str) -> String {
    INDEX_HTML.replace("{{TODAY}}", today)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Habits</title>
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
      --teal: #2a9d8f;
      --purple: #9d8fd6;
      --green: #3c9d5d;
      --blue: #4a86c5;
      --orange: #e9a23b;
      --pink: #c5528b;
    }

    * {
      box-sizing: border-box;
    }

    body.dark {
      --bg-1: #1d1f22;
      --bg-2: #2f3a40;
      --ink: #ece7df;
      --card: rgba(36, 39, 43, 0.92);
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), var(--bg-1) 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(980px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
      animation: rise 600ms ease;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      align-items: flex-end;
      gap: 12px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    h2 {
      margin: 0;
      font-size: 1.3rem;
    }

    .subtitle {
      margin: 0;
      color: #8b857d;
      font-size: 1rem;
    }

    .banner {
      display: none;
      border-radius: 14px;
      padding: 10px 16px;
      background: rgba(233, 162, 59, 0.16);
      color: #8a5a12;
    }

    .banner.visible {
      display: block;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
      color: #2b2a28;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.6rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 10px 16px;
      font-size: 0.95rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent-2);
      color: white;
      transition: transform 150ms ease;
    }

    button:active {
      transform: scale(0.97);
    }

    button.ghost {
      background: rgba(47, 72, 88, 0.08);
      color: var(--accent-2);
    }

    button.danger {
      background: #c63b2b;
    }

    .card {
      background: white;
      color: #2b2a28;
      border-radius: 20px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 14px;
      overflow-x: auto;
    }

    .row-header {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      align-items: center;
      gap: 12px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th, td {
      padding: 8px 6px;
      text-align: center;
      font-size: 0.9rem;
    }

    th:first-child, td:first-child {
      text-align: left;
    }

    th.today {
      color: var(--accent);
    }

    .cell {
      width: 38px;
      height: 38px;
      border-radius: 12px;
      border: 2px solid rgba(47, 72, 88, 0.12);
      background: transparent;
      color: var(--accent-2);
      padding: 0;
      font-size: 0.8rem;
    }

    .cell.done, .cell.amount {
      background: var(--habit-color);
      border-color: var(--habit-color);
      color: white;
    }

    .cell.zero {
      border-color: var(--habit-color);
      color: var(--habit-color);
    }

    .cell:disabled {
      opacity: 0.3;
      cursor: not-allowed;
    }

    .habit-name {
      display: flex;
      align-items: center;
      gap: 8px;
      font-weight: 600;
    }

    .dot {
      width: 10px;
      height: 10px;
      border-radius: 50%;
      background: var(--habit-color);
    }

    .streak {
      font-size: 0.8rem;
      color: #8b857d;
      font-weight: 400;
    }

    form.inline {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    input, select {
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      padding: 9px 12px;
      font: inherit;
    }

    .bar {
      height: 8px;
      border-radius: 999px;
      background: rgba(47, 72, 88, 0.08);
      overflow: hidden;
    }

    .bar span {
      display: block;
      height: 100%;
      background: var(--habit-color);
    }

    .calendar {
      table-layout: fixed;
    }

    .calendar td {
      text-align: center;
    }

    .calendar .cell {
      width: 100%;
      max-width: 48px;
    }

    .month-label {
      min-width: 140px;
      display: inline-block;
      text-align: center;
      font-weight: 600;
    }

    dialog {
      border: none;
      border-radius: 20px;
      padding: 24px;
      box-shadow: var(--shadow);
      width: min(420px, 92vw);
    }

    dialog::backdrop {
      background: rgba(43, 42, 40, 0.35);
    }

    dialog form {
      display: grid;
      gap: 12px;
    }

    dialog .actions {
      display: flex;
      justify-content: flex-end;
      gap: 10px;
    }

    .status {
      font-size: 0.95rem;
      color: #6b645d;
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }

    @keyframes rise {
      from {
        opacity: 0;
        transform: translateY(18px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }

    @media (max-width: 600px) {
      .app {
        padding: 28px 16px;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>Habits</h1>
        <p class="subtitle">Today is <span id="today">{{TODAY}}</span></p>
      </div>
      <div class="form inline">
        <select id="sort-by" aria-label="Sort habits">
          <option value="order">Custom order</option>
          <option value="name">By name</option>
        </select>
        <button class="ghost" id="theme-toggle" type="button">Toggle theme</button>
      </div>
    </header>

    <div id="storage-banner" class="banner">Fallback storage in use. Changes are still saved locally.</div>

    <section class="panel">
      <div class="stat"><span class="label">Habits</span><span id="total-habits" class="value">0</span></div>
      <div class="stat"><span class="label">Done today</span><span id="today-rate" class="value">0%</span></div>
      <div class="stat"><span class="label">Completions</span><span id="total-completions" class="value">0</span></div>
      <div class="stat"><span class="label">Best streak</span><span id="best-streak" class="value">0</span></div>
    </section>

    <section class="card">
      <div class="row-header">
        <h2>This week</h2>
        <div>
          <button class="ghost" id="prev-week" type="button">&larr;</button>
          <button class="ghost" id="this-week" type="button">Today</button>
          <button class="ghost" id="next-week" type="button">&rarr;</button>
        </div>
      </div>
      <table>
        <thead><tr id="grid-head"></tr></thead>
        <tbody id="grid-body"></tbody>
      </table>
      <form id="habit-form" class="inline">
        <input id="habit-name" name="name" placeholder="New habit" required />
        <select id="habit-type" name="type">
          <option value="yesno">Yes / No</option>
          <option value="numeric">Numeric</option>
        </select>
        <input id="habit-description" name="description" placeholder="Description" />
        <input id="habit-unit" name="unit" placeholder="Unit (numeric)" />
        <input id="habit-target" name="target" type="number" min="0" step="any" placeholder="Target (numeric)" />
        <select id="habit-color" name="color">
          <option value="teal">Teal</option>
          <option value="purple">Purple</option>
          <option value="green">Green</option>
          <option value="blue">Blue</option>
          <option value="orange">Orange</option>
          <option value="pink">Pink</option>
        </select>
        <button type="submit">Add habit</button>
      </form>
    </section>

    <section class="card">
      <div class="row-header">
        <h2>Calendar</h2>
        <select id="calendar-habit" aria-label="Calendar habit"></select>
        <div>
          <button class="ghost" id="prev-month" type="button">&larr;</button>
          <span id="month-label" class="month-label"></span>
          <button class="ghost" id="next-month" type="button">&rarr;</button>
        </div>
      </div>
      <table class="calendar">
        <thead><tr><th>Sun</th><th>Mon</th><th>Tue</th><th>Wed</th><th>Thu</th><th>Fri</th><th>Sat</th></tr></thead>
        <tbody id="calendar-body"></tbody>
      </table>
    </section>

    <section class="card">
      <h2>Strength</h2>
      <div id="strength-list"></div>
    </section>

    <section class="card">
      <h2>Backup</h2>
      <div class="form inline">
        <button class="ghost" id="export-btn" type="button">Export JSON</button>
        <select id="import-mode" aria-label="Import mode">
          <option value="overwrite">Replace everything</option>
          <option value="merge">Merge into current data</option>
        </select>
        <input id="import-file" type="file" accept="application/json" />
        <button class="danger" id="clear-btn" type="button">Clear all data</button>
      </div>
    </section>

    <div id="status" class="status" aria-live="polite"></div>
  </main>

  <dialog id="edit-dialog">
    <form id="edit-form" method="dialog">
      <h2>Edit habit</h2>
      <input id="edit-name" name="name" placeholder="Name" required />
      <input id="edit-description" name="description" placeholder="Description" />
      <input id="edit-target" name="target" type="number" min="0" step="any" placeholder="Target" />
      <div class="actions">
        <button class="ghost" id="edit-cancel" type="button">Cancel</button>
        <button type="submit">Save</button>
      </div>
    </form>
  </dialog>

  <script>
    const statusEl = document.getElementById('status');
    const todayKey = document.getElementById('today').textContent;
    let endDate = todayKey;
    let sortBy = localStorage.getItem('sort') === 'name' ? 'name' : 'order';
    let calendarMonth = todayKey.slice(0, 7);
    let calendarHabit = '';
    let habitsById = {};
    let editing = null;

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const api = async (path, options = {}) => {
      const res = await fetch(path, {
        headers: { 'content-type': 'application/json' },
        ...options
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.status === 204 ? null : res.json();
    };

    const shiftDate = (date, days) => {
      const d = new Date(date + 'T00:00:00');
      d.setDate(d.getDate() + days);
      return `${d.getFullYear()}-${pad(d.getMonth() + 1)}-${pad(d.getDate())}`;
    };

    const pad = (n) => String(n).padStart(2, '0');

    const shiftMonth = (month, delta) => {
      const [y, m] = month.split('-').map(Number);
      const d = new Date(y, m - 1 + delta, 1);
      return `${d.getFullYear()}-${pad(d.getMonth() + 1)}`;
    };

    const monthBounds = (month) => {
      const [y, m] = month.split('-').map(Number);
      const days = new Date(y, m, 0).getDate();
      return { first: `${month}-01`, last: `${month}-${pad(days)}`, days, offset: new Date(y, m - 1, 1).getDay() };
    };

    const cellButton = (row, cell) => {
      const button = document.createElement('button');
      button.type = 'button';
      button.className = 'cell';
      button.disabled = cell.isFuture;
      if (cell.status === 'done') {
        button.classList.add('done');
        button.textContent = '✓';
      } else if (cell.status === 'amount') {
        button.classList.add(cell.amount > 0 ? 'amount' : 'zero');
        button.textContent = cell.amount;
      }
      button.addEventListener('click', () => {
        const action = row.type === 'numeric' ? editAmount(row, cell) : toggle(row, cell);
        action.catch((err) => setStatus(err.message, 'error'));
      });
      return button;
    };

    const toggle = async (row, cell) => {
      await api(`/api/habits/${row.habitId}/completions/${cell.date}/toggle`, { method: 'POST' });
      await refresh();
    };

    const editAmount = async (row, cell) => {
      const unit = row.unit ? ` (${row.unit})` : '';
      const input = prompt(`${row.name} on ${cell.date}${unit}. Leave empty to clear.`, cell.amount ?? '');
      if (input === null) return;
      const path = `/api/habits/${row.habitId}/completions/${cell.date}`;
      if (input.trim() === '') {
        await api(path, { method: 'DELETE' });
      } else {
        const value = parseFloat(input);
        if (Number.isNaN(value) || value < 0) {
          throw new Error('Please enter a valid number');
        }
        await api(path, { method: 'PUT', body: JSON.stringify({ value }) });
      }
      await refresh();
    };

    const renderGrid = (grid) => {
      const head = document.getElementById('grid-head');
      const body = document.getElementById('grid-body');
      head.innerHTML = '<th>Habit</th>';
      body.innerHTML = '';

      const first = grid.rows[0];
      const labels = first ? first.cells : [];
      labels.forEach((cell) => {
        const th = document.createElement('th');
        th.textContent = cell.label;
        if (cell.isToday) th.className = 'today';
        head.appendChild(th);
      });

      grid.rows.forEach((row) => {
        const tr = document.createElement('tr');
        tr.style.setProperty('--habit-color', `var(--${row.color}, var(--teal))`);
        const name = document.createElement('td');
        name.innerHTML = `<span class="habit-name"><span class="dot"></span><span></span><span class="streak"></span></span>`;
        name.querySelector('span span:nth-child(2)').textContent = row.name;
        name.querySelector('.streak').textContent = row.currentStreak > 0 ? `${row.currentStreak} day streak` : '';
        const remove = document.createElement('button');
        remove.className = 'ghost';
        remove.type = 'button';
        remove.textContent = '×';
        remove.title = 'Delete habit';
        remove.addEventListener('click', () => {
          if (!confirm(`Delete "${row.name}" and all of its history?`)) return;
          api(`/api/habits/${row.habitId}`, { method: 'DELETE' })
            .then(refresh)
            .catch((err) => setStatus(err.message, 'error'));
        });
        const edit = document.createElement('button');
        edit.className = 'ghost';
        edit.type = 'button';
        edit.textContent = '✎';
        edit.title = 'Edit habit';
        edit.addEventListener('click', () => openEdit(row.habitId));
        name.querySelector('.habit-name').appendChild(edit);
        name.querySelector('.habit-name').appendChild(remove);
        tr.appendChild(name);

        row.cells.forEach((cell) => {
          const td = document.createElement('td');
          td.appendChild(cellButton(row, cell));
          tr.appendChild(td);
        });
        body.appendChild(tr);
      });
    };

    const renderStats = (stats) => {
      document.getElementById('total-habits').textContent = stats.totalHabits;
      document.getElementById('today-rate').textContent = `${stats.todayCompletionRate}%`;
      document.getElementById('total-completions').textContent = stats.totalCompletions;
      document.getElementById('best-streak').textContent = stats.bestStreak;

      const habits = sortBy === 'name'
        ? [...stats.habits].sort((a, b) => a.name.toLowerCase().localeCompare(b.name.toLowerCase()))
        : stats.habits;
      habitsById = Object.fromEntries(habits.map((habit) => [habit.id, habit]));

      const picker = document.getElementById('calendar-habit');
      if (!habitsById[calendarHabit]) {
        calendarHabit = habits.length ? habits[0].id : '';
      }
      picker.innerHTML = '';
      habits.forEach((habit) => {
        const option = document.createElement('option');
        option.value = habit.id;
        option.textContent = habit.name;
        picker.appendChild(option);
      });
      picker.value = calendarHabit;

      const list = document.getElementById('strength-list');
      list.innerHTML = '';
      habits.forEach((habit) => {
        const item = document.createElement('div');
        item.style.setProperty('--habit-color', `var(--${habit.color}, var(--teal))`);
        item.innerHTML = `<p class="habit-name"></p><div class="bar"><span></span></div><p class="streak"></p>`;
        item.querySelector('.habit-name').textContent = `${habit.name} · ${habit.stats.strength}%`;
        item.querySelector('.bar span').style.width = `${habit.stats.strength}%`;
        item.querySelector('.streak').textContent =
          `Current ${habit.stats.currentStreak} · Longest ${habit.stats.longestStreak} · 30 days ${habit.stats.completionRate30Days}%`;
        list.appendChild(item);
      });
    };

    const renderCalendar = async () => {
      const bounds = monthBounds(calendarMonth);
      const label = new Date(`${bounds.first}T00:00:00`);
      document.getElementById('month-label').textContent =
        label.toLocaleDateString(undefined, { month: 'long', year: 'numeric' });
      document.getElementById('next-month').disabled = calendarMonth >= todayKey.slice(0, 7);

      const body = document.getElementById('calendar-body');
      body.innerHTML = '';
      if (!calendarHabit) return;

      const grid = await api(`/api/grid?days=${bounds.days}&end=${bounds.last}`);
      const row = grid.rows.find((r) => r.habitId === calendarHabit);
      if (!row) return;

      let tr = document.createElement('tr');
      tr.style.setProperty('--habit-color', `var(--${row.color}, var(--teal))`);
      for (let i = 0; i < bounds.offset; i += 1) {
        tr.appendChild(document.createElement('td'));
      }
      row.cells.forEach((cell) => {
        if (tr.children.length === 7) {
          body.appendChild(tr);
          tr = document.createElement('tr');
          tr.style.setProperty('--habit-color', `var(--${row.color}, var(--teal))`);
        }
        const td = document.createElement('td');
        const button = cellButton(row, cell);
        if (cell.status === 'empty') button.textContent = Number(cell.date.slice(8));
        button.title = cell.date;
        td.appendChild(button);
        tr.appendChild(td);
      });
      body.appendChild(tr);
    };

    const refresh = async () => {
      const [grid, stats] = await Promise.all([
        api(`/api/grid?days=7&end=${endDate}&sort=${sortBy}`),
        api('/api/stats')
      ]);
      renderGrid(grid);
      renderStats(stats);
      await renderCalendar();
    };

    const dialog = document.getElementById('edit-dialog');

    const openEdit = (id) => {
      const habit = habitsById[id];
      if (!habit) return;
      editing = habit;
      document.getElementById('edit-name').value = habit.name;
      document.getElementById('edit-description').value = habit.description || '';
      const target = document.getElementById('edit-target');
      target.value = habit.target ?? '';
      target.hidden = habit.type !== 'numeric';
      dialog.showModal();
    };

    document.getElementById('edit-cancel').addEventListener('click', () => dialog.close());

    document.getElementById('edit-form').addEventListener('submit', (event) => {
      event.preventDefault();
      if (!editing) return;
      const name = document.getElementById('edit-name').value.trim();
      if (!name) return;
      const body = { name, description: document.getElementById('edit-description').value.trim() };
      const target = document.getElementById('edit-target').value;
      if (editing.type === 'numeric' && target !== '') body.target = Number(target);
      api(`/api/habits/${editing.id}`, { method: 'PUT', body: JSON.stringify(body) })
        .then(() => {
          dialog.close();
          editing = null;
          setStatus('Habit updated', 'ok');
          return refresh();
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    const sortSelect = document.getElementById('sort-by');
    sortSelect.value = sortBy;
    sortSelect.addEventListener('change', () => {
      sortBy = sortSelect.value;
      localStorage.setItem('sort', sortBy);
      refresh().catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('calendar-habit').addEventListener('change', (event) => {
      calendarHabit = event.target.value;
      renderCalendar().catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('prev-month').addEventListener('click', () => {
      calendarMonth = shiftMonth(calendarMonth, -1);
      renderCalendar().catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('next-month').addEventListener('click', () => {
      calendarMonth = shiftMonth(calendarMonth, 1);
      renderCalendar().catch((err) => setStatus(err.message, 'error'));
    });

    const loadStorage = async () => {
      const info = await api('/api/storage');
      document.getElementById('storage-banner').classList.toggle('visible', info.degraded);
    };

    document.getElementById('habit-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const name = document.getElementById('habit-name').value.trim();
      if (!name) return;
      const type = document.getElementById('habit-type').value;
      const description = document.getElementById('habit-description').value.trim();
      const unit = document.getElementById('habit-unit').value.trim();
      const target = document.getElementById('habit-target').value;
      const color = document.getElementById('habit-color').value;
      const body = { name, type, color, description: description || null, unit: unit || null };
      if (type === 'numeric' && target !== '') body.target = Number(target);
      api('/api/habits', {
        method: 'POST',
        body: JSON.stringify(body)
      })
        .then(() => {
          event.target.reset();
          setStatus('Habit added', 'ok');
          return refresh();
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('prev-week').addEventListener('click', () => {
      endDate = shiftDate(endDate, -7);
      refresh().catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('next-week').addEventListener('click', () => {
      const next = shiftDate(endDate, 7);
      endDate = next > todayKey ? todayKey : next;
      refresh().catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('this-week').addEventListener('click', () => {
      endDate = todayKey;
      refresh().catch((err) => setStatus(err.message, 'error'));
    });

    document.getElementById('export-btn').addEventListener('click', async () => {
      try {
        const data = await api('/api/export');
        const blob = new Blob([JSON.stringify(data, null, 2)], { type: 'application/json' });
        const link = document.createElement('a');
        link.href = URL.createObjectURL(blob);
        link.download = `habits-backup-${todayKey}.json`;
        link.click();
        URL.revokeObjectURL(link.href);
        setStatus('Backup exported', 'ok');
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    document.getElementById('import-file').addEventListener('change', async (event) => {
      const file = event.target.files && event.target.files[0];
      if (!file) return;
      try {
        let data;
        try {
          data = JSON.parse(await file.text());
        } catch (_) {
          throw new Error('Invalid JSON file');
        }
        const mode = document.getElementById('import-mode').value;
        if (mode === 'overwrite' && !confirm('Replace all current habits with this backup?')) return;
        const result = await api(`/api/import?mode=${mode}`, {
          method: 'POST',
          body: JSON.stringify(data)
        });
        setStatus(`Imported ${result.habits} habits and ${result.completions} completions`, 'ok');
        await refresh();
      } catch (err) {
        setStatus(err.message, 'error');
      } finally {
        event.target.value = '';
      }
    });

    document.getElementById('clear-btn').addEventListener('click', () => {
      if (!confirm('Delete every habit and completion?')) return;
      api('/api/data', { method: 'DELETE' })
        .then(() => {
          setStatus('All data cleared', 'ok');
          return refresh();
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    const applyTheme = (dark) => {
      document.body.classList.toggle('dark', dark);
      localStorage.setItem('theme', dark ? 'dark' : 'light');
    };

    document.getElementById('theme-toggle').addEventListener('click', () => {
      applyTheme(!document.body.classList.contains('dark'));
    });

    applyTheme(localStorage.getItem('theme') === 'dark');
    Promise.all([refresh(), loadStorage()]).catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_shows_today() {
        let html = render_index("2026-01-05");
        assert!(html.contains(r#"<span id="today">2026-01-05</span>"#));
        assert!(!html.contains("{{TODAY}}"));
    }

    #[test]
    fn index_wires_edit_calendar_and_import_mode() {
        let html = render_index("2026-01-05");
        assert!(html.contains(r#"<dialog id="edit-dialog">"#));
        assert!(html.contains(r#"id="calendar-body""#));
        assert!(html.contains(r#"<option value="merge">"#));
        assert!(html.contains("/api/import?mode=${mode}"));
        assert!(html.contains("&sort=${sortBy}"));
    }
}
