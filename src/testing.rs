use crate::bank::{Transfer, TransferStatus};
use crate::browser::Browser;
use crate::core::{BankAdapter, BrowserConfig, Credentials};
use crate::entries::EntrySet;
use crate::errors::{BankError, BankResult};
use async_trait::async_trait;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct TestHelper;

impl TestHelper {
    pub fn browser() -> Browser {
        let config = BrowserConfig {
            timeout_ms: 5000,
            connect_timeout_ms: 2000,
            ..Default::default()
        };
        Browser::new(config).expect("test browser")
    }

    fn page(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8")
    }

    /// A small online bank: login form, overview, statement, transfer form,
    /// logout. Pages behind the login require the `bsid` cookie.
    pub async fn mock_bank() -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/banking/login"))
            .respond_with(Self::page(LOGIN_PAGE))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/banking/auth"))
            .and(body_string_contains("csrf=f00d"))
            .and(body_string_contains("kennung=alice"))
            .and(body_string_contains("pin=secret"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", "/banking/overview")
                    .insert_header("Set-Cookie", "bsid=s3ss10n; Path=/banking; HttpOnly"),
            )
            .with_priority(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/banking/auth"))
            .respond_with(Self::page(
                "<p class='error'>Anmeldung fehlgeschlagen</p><form action='auth'></form>",
            ))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/banking/overview"))
            .and(header("cookie", "bsid=s3ss10n"))
            .respond_with(Self::page(OVERVIEW_PAGE))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/banking/umsaetze"))
            .and(header("cookie", "bsid=s3ss10n"))
            .respond_with(Self::page(STATEMENT_PAGE))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/banking/logout"))
            .respond_with(Self::page("<h1>Sie wurden abgemeldet</h1>"))
            .mount(&server)
            .await;

        server
    }
}

const LOGIN_PAGE: &str = r#"<html><head><title>Online-Banking</title></head><body>
<form name="login" action="auth" method="post">
  <input type="hidden" name="csrf" value="f00d">
  <table>
    <tr><td>Kennung</td><td><input name="kennung"></td></tr>
    <tr><td>PIN</td><td><input type="password" name="pin"></td></tr>
  </table>
  <input type="submit" value="Anmelden">
</form></body></html>"#;

const OVERVIEW_PAGE: &str = r#"<html><head><title>Finanzstatus</title></head><body>
<div id="nav"><a href="umsaetze?konto=1">Umsätze</a> | <a href="logout">Abmelden</a></div>
<p>Willkommen, Alice</p>
</body></html>"#;

const STATEMENT_PAGE: &str = r#"<html><body>
<table class="umsatzliste">
  <tr><th>Buchung</th><th>Valuta</th><th>Verwendungszweck</th><th>Konto</th><th>BLZ</th><th>Betrag</th></tr>
  <tr><td>01.03.2024</td><td>01.03.2024</td><td>Miete März<br>Hausverwaltung</td><td>DE02 1203 0000 0000 2020 51</td><td>BYLADEM1001</td><td>-750,00</td></tr>
  <tr><td>02.03.2024</td><td>03.03.2024</td><td>Rechnung REF 123</td><td>DE89 3704 0044 0532 0130 00</td><td>COBADEFFXXX</td><td>49,90</td></tr>
  <tr><td>05.03.2024</td><td></td><td>Zinsen</td><td></td><td></td><td>0,12</td></tr>
</table>
<a href="overview">Zurück</a> <a href="logout">Abmelden</a>
</body></html>"#;

/// Adapter for [`TestHelper::mock_bank`], written the way a real
/// institution adapter is: only navigate/enter/click and `EntrySet::add`.
pub struct ScriptedBank {
    base: String,
}

impl ScriptedBank {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait(?Send)]
impl BankAdapter for ScriptedBank {
    async fn run_login(&mut self, browser: &mut Browser, credentials: &Credentials) -> bool {
        if browser
            .navigate(&format!("{}/banking/login", self.base))
            .await
            .is_err()
        {
            return false;
        }
        if browser.enter("kennung", &credentials.user).is_err()
            || browser.enter("pin", &credentials.password).is_err()
        {
            return false;
        }
        match browser.click("Anmelden").await {
            Ok(Some(page)) => page.link_by_text("Abmelden").is_some(),
            _ => false,
        }
    }

    async fn run_get_entries(&mut self, browser: &mut Browser) -> BankResult<EntrySet> {
        let page = browser
            .click("Umsätze")
            .await?
            .ok_or_else(|| BankError::EntriesUnavailable("no statement link".to_string()))?;
        let table = page
            .by_classes(&["umsatzliste"])
            .ok_or_else(|| BankError::EntriesUnavailable("no statement table".to_string()))?;

        let mut entries = EntrySet::new();
        for row in table.descendants_by_tag("tr") {
            let cells = row.cells();
            if !row.children_by_tag("th").is_empty() || cells.len() < 6 {
                continue;
            }
            // <br> inside the purpose cell separates description lines
            let purpose = row
                .children_by_tag("td")
                .get(2)
                .map(|td| td.node().text().collect::<Vec<_>>())
                .unwrap_or_default();
            entries.add(&cells[5], &cells[0], &cells[1], purpose, &cells[3], &cells[4]);
        }
        Ok(entries)
    }

    async fn run_start_transaction(
        &mut self,
        _browser: &mut Browser,
        _transfer: &Transfer,
    ) -> BankResult<TransferStatus> {
        Ok(TransferStatus::NeedsConfirmation)
    }

    async fn run_logout(&mut self, browser: &mut Browser) -> bool {
        match browser.click("Abmelden").await {
            Ok(Some(page)) => page.by_text("Sie wurden abgemeldet").is_some(),
            _ => false,
        }
    }
}
