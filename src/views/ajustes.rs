use chrono::Utc;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use super::shared::{error_text, page_shell};
use super::AppContext;
use crate::controller;
use crate::download::download_file;

#[function_component(AjustesPage)]
pub fn ajustes_page() -> Html {
    let ctx = use_context::<AppContext>();
    let exporting = use_state(|| false);
    let error = use_state(|| None::<String>);
    let done = use_state(|| None::<String>);

    let on_export = {
        let ctx = ctx.clone();
        let exporting = exporting.clone();
        let error = error.clone();
        let done = done.clone();
        Callback::from(move |_: MouseEvent| {
            let Some(ctx) = ctx.clone() else {
                return;
            };
            if *exporting {
                return;
            }
            let exporting = exporting.clone();
            let error = error.clone();
            let done = done.clone();
            exporting.set(true);
            error.set(None);
            done.set(None);

            spawn_local(async move {
                match controller::export_backup(&ctx.api, Utc::now()).await {
                    Ok(file) => match download_file(&file) {
                        Ok(()) => done.set(Some(format!("Descargado {}", file.filename))),
                        Err(e) => {
                            log::warn!("Backup download failed: {:?}", e);
                            error.set(Some("Error al exportar".to_string()));
                        }
                    },
                    Err(e) => error.set(Some(e.to_string())),
                }
                exporting.set(false);
            });
        })
    };

    let on_logout = Callback::from(move |_: MouseEvent| {
        if let Some(ctx) = ctx.as_ref() {
            let effect = controller::logout(ctx.api.session());
            ctx.apply_navigation(effect);
        }
    });

    html! {
        { page_shell(
            "Ajustes",
            html! {},
            html! {
                <div class="grid grid-cols-1 md:grid-cols-2 gap-6">
                    <div class="bg-card rounded-lg p-6 border border-border">
                        <h2 class="text-xl font-bold text-foreground mb-4">{"Copia de seguridad"}</h2>
                        <p class="text-sm text-muted-foreground mb-4">{"Descarga todos los datos en un fichero JSON."}</p>
                        <button id="btnExportBackup" onclick={on_export} disabled={*exporting} class="bg-primary text-primary-foreground px-4 py-2 rounded-lg font-semibold">
                            { if *exporting { "Exportando..." } else { "Exportar backup" } }
                        </button>
                        { error_text(&error) }
                        {
                            if let Some(msg) = &*done {
                                html! { <p class="text-sm text-green-600 mt-2">{ msg.clone() }</p> }
                            } else {
                                html! {}
                            }
                        }
                    </div>
                    <div class="bg-card rounded-lg p-6 border border-border">
                        <h2 class="text-xl font-bold text-foreground mb-4">{"Sesión"}</h2>
                        <button id="logoutBtn" onclick={on_logout} class="px-4 py-2 rounded-lg border border-border font-semibold">
                            {"Cerrar sesión"}
                        </button>
                    </div>
                </div>
            }
        ) }
    }
}
