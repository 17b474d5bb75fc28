pub const QUERY: &'static str = r#"
	BEGIN;

	CREATE TABLE version (
		major INTEGER NOT NULL,
		minor INTEGER NOT NULL
	);
	INSERT INTO version VALUES (0, 0);

	CREATE TABLE profile (
		id INTEGER PRIMARY KEY AUTOINCREMENT,
		user TEXT NOT NULL,
		display_name TEXT,
		created INTEGER NOT NULL,
		UNIQUE(user)
	);

	CREATE TABLE friend (
		id INTEGER PRIMARY KEY AUTOINCREMENT,
		profile_id INTEGER NOT NULL,
		friend_user TEXT NOT NULL,
		UNIQUE(profile_id, friend_user),
		FOREIGN KEY(profile_id) REFERENCES profile(id)
	);

	CREATE TABLE relationship (
		id INTEGER PRIMARY KEY AUTOINCREMENT,
		sender_id INTEGER NOT NULL,
		receiver_id INTEGER NOT NULL,
		status TEXT NOT NULL,
		created INTEGER NOT NULL,
		UNIQUE(sender_id, receiver_id),
		FOREIGN KEY(sender_id) REFERENCES profile(id),
		FOREIGN KEY(receiver_id) REFERENCES profile(id)
	);

	CREATE TABLE post (
		id INTEGER PRIMARY KEY AUTOINCREMENT,
		author TEXT NOT NULL,
		message TEXT NOT NULL,
		created INTEGER NOT NULL
	);

	CREATE TABLE comment (
		id INTEGER PRIMARY KEY AUTOINCREMENT,
		post_id INTEGER NOT NULL,
		author TEXT NOT NULL,
		message TEXT NOT NULL,
		created INTEGER NOT NULL,
		FOREIGN KEY(post_id) REFERENCES post(id)
	);

	CREATE TABLE post_like (
		id INTEGER PRIMARY KEY AUTOINCREMENT,
		post_id INTEGER NOT NULL,
		author TEXT NOT NULL,
		created INTEGER NOT NULL,
		UNIQUE(post_id, author),
		FOREIGN KEY(post_id) REFERENCES post(id)
	);

	COMMIT;
"#;
