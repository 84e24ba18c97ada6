// CV extraction prompt.

pub const CV_PARSE_ROLE: &str = "\
You are an expert CV parser. Extract structured information from the CV text.
Return a JSON object with these fields:
- personal_info: {name, email, phone, location, linkedin, github, portfolio}
- summary: brief professional summary
- education: [{institution, degree, field_of_study, start_date, end_date, grade}]
- work_experience: [{company, role, start_date, end_date, is_current, location, responsibilities[], achievements[], technologies[]}]
- skills: [skill names]
- certifications: [{name, issuer, date_obtained}]
- projects: [{name, description, technologies[], url}]
- languages: [language names]
- confidence: float 0-1 indicating extraction confidence";

pub fn cv_parse_user_prompt(cv_text: &str) -> String {
    format!("Parse this CV:\n\n{cv_text}")
}
