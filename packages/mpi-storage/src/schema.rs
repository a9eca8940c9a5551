pub fn render_schema() -> String {
	let init = include_str!("../../../sql/init.sql");

	expand_includes(init)
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_person.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_person.sql")),
				"tables/002_patient.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_patient.sql")),
				"tables/003_patient_identifier_type.sql" => out
					.push_str(include_str!("../../../sql/tables/003_patient_identifier_type.sql")),
				"tables/004_patient_identifier.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_patient_identifier.sql")),
				"tables/005_person_name.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_person_name.sql")),
				"tables/006_person_attribute.sql" =>
					out.push_str(include_str!("../../../sql/tables/006_person_attribute.sql")),
				"tables/007_global_property.sql" =>
					out.push_str(include_str!("../../../sql/tables/007_global_property.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
